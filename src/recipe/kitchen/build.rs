// src/recipe/kitchen/build.rs

//! Build Invocation: configure and run an external build system

use crate::error::{Error, Result};
use crate::filesystem::path::join_under;
use crate::recipe::format::BuildSection;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use super::source::SourceTree;

/// Settings axis values resolved by the hosting runtime
///
/// Values are opaque here; they are handed to the build system verbatim.
/// Iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSettings {
    values: Vec<(String, String)>,
}

impl ResolvedSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an axis, replacing any earlier value in place
    pub fn set(&mut self, axis: impl Into<String>, value: impl Into<String>) {
        let axis = axis.into();
        let value = value.into();
        match self.values.iter_mut().find(|(a, _)| *a == axis) {
            Some(slot) => slot.1 = value,
            None => self.values.push((axis, value)),
        }
    }

    pub fn with(mut self, axis: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(axis, value);
        self
    }

    /// Parse `axis=value`
    pub fn parse_assignment(&mut self, assignment: &str) -> Result<()> {
        let (axis, value) = assignment.split_once('=').ok_or_else(|| {
            Error::Configuration(format!("Expected AXIS=VALUE, got {:?}", assignment))
        })?;
        if axis.trim().is_empty() {
            return Err(Error::Configuration(format!(
                "Empty settings axis in {:?}",
                assignment
            )));
        }
        self.set(axis.trim(), value.trim());
        Ok(())
    }

    pub fn get(&self, axis: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(a, _)| a == axis)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(a, v)| (a.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Declared axes that have no value
    pub fn missing<'a>(&self, declared: &'a [String]) -> Vec<&'a str> {
        declared
            .iter()
            .filter(|axis| self.get(axis).is_none())
            .map(|axis| axis.as_str())
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResolvedSettings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut settings = Self::new();
        for (axis, value) in iter {
            settings.set(axis, value);
        }
        settings
    }
}

/// Tree produced by a successful build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutputTree {
    root: PathBuf,
}

impl BuildOutputTree {
    /// Refer to a build output tree that is already on disk
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// A finished build: the output tree and everything the tool printed
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub tree: BuildOutputTree,
    pub log: String,
}

/// What a build tool is asked to do
#[derive(Debug, Clone, Copy)]
pub struct BuildRequest<'a> {
    /// Directory configuration is rooted at
    pub source_dir: &'a Path,
    /// Build output directory (exists, may be empty)
    pub output_dir: &'a Path,
    pub settings: &'a ResolvedSettings,
    pub jobs: u32,
}

/// An external build system, split into its two phases
///
/// Implementations only assemble commands; running them, capturing their
/// output and mapping failures is done by [`invoke_build`].
pub trait BuildTool {
    fn name(&self) -> &str;

    /// Configure command, if the tool has a configure phase
    fn configure(&self, request: &BuildRequest<'_>) -> Result<Option<Command>>;

    /// Build command
    fn build(&self, request: &BuildRequest<'_>) -> Result<Command>;
}

/// CMake: `cmake -S <src> -B <out> -D...` then `cmake --build <out>`
#[derive(Debug, Clone)]
pub struct CMakeTool {
    program: String,
    defines: BTreeMap<String, String>,
}

impl CMakeTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            defines: BTreeMap::new(),
        }
    }

    /// Extra `-D` definitions appended after the settings
    pub fn with_defines(mut self, defines: BTreeMap<String, String>) -> Self {
        self.defines = defines;
        self
    }

    fn cmake(&self) -> Result<PathBuf> {
        which::which(&self.program).map_err(|e| {
            Error::Configuration(format!("{} not found in PATH: {}", self.program, e))
        })
    }

    /// Arguments for the configure phase
    pub fn configure_args(&self, request: &BuildRequest<'_>) -> Vec<String> {
        let mut args = vec![
            "-S".to_string(),
            request.source_dir.display().to_string(),
            "-B".to_string(),
            request.output_dir.display().to_string(),
        ];
        for (axis, value) in request.settings.iter() {
            args.push(format!("-D{}={}", axis, value));
        }
        for (key, value) in &self.defines {
            args.push(format!("-D{}={}", key, value));
        }
        args
    }

    /// Arguments for the build phase
    pub fn build_args(&self, request: &BuildRequest<'_>) -> Vec<String> {
        let mut args = vec![
            "--build".to_string(),
            request.output_dir.display().to_string(),
            "--parallel".to_string(),
            request.jobs.to_string(),
        ];
        // Multi-config generators pick the configuration at build time
        if let Some(build_type) = request.settings.get("build_type") {
            args.push("--config".to_string());
            args.push(build_type.to_string());
        }
        args
    }
}

impl BuildTool for CMakeTool {
    fn name(&self) -> &str {
        "cmake"
    }

    fn configure(&self, request: &BuildRequest<'_>) -> Result<Option<Command>> {
        let mut cmd = Command::new(self.cmake()?);
        cmd.args(self.configure_args(request));
        Ok(Some(cmd))
    }

    fn build(&self, request: &BuildRequest<'_>) -> Result<Command> {
        let mut cmd = Command::new(self.cmake()?);
        cmd.args(self.build_args(request));
        Ok(cmd)
    }
}

/// Shell commands run in the build output directory
///
/// Each settings axis is exported as `LARDER_SETTING_<AXIS>`; the
/// configure root and output directory as `LARDER_SOURCE_DIR` and
/// `LARDER_BUILD_DIR`.
#[derive(Debug, Clone)]
pub struct CommandTool {
    shell: String,
    configure: Option<String>,
    build: String,
}

impl CommandTool {
    pub fn new(shell: impl Into<String>, configure: Option<String>, build: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            configure,
            build: build.into(),
        }
    }

    fn shell_command(&self, script: &str, request: &BuildRequest<'_>) -> Command {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(script)
            .current_dir(request.output_dir)
            .env("LARDER_SOURCE_DIR", request.source_dir)
            .env("LARDER_BUILD_DIR", request.output_dir)
            .env("MAKEFLAGS", format!("-j{}", request.jobs));
        for (axis, value) in request.settings.iter() {
            cmd.env(setting_env_name(axis), value);
        }
        cmd
    }
}

impl BuildTool for CommandTool {
    fn name(&self) -> &str {
        "command"
    }

    fn configure(&self, request: &BuildRequest<'_>) -> Result<Option<Command>> {
        Ok(self
            .configure
            .as_deref()
            .map(|script| self.shell_command(script, request)))
    }

    fn build(&self, request: &BuildRequest<'_>) -> Result<Command> {
        Ok(self.shell_command(&self.build, request))
    }
}

/// Environment variable name a settings axis is exported under
pub fn setting_env_name(axis: &str) -> String {
    let normalized: String = axis
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("LARDER_SETTING_{}", normalized)
}

/// Configure and build `source` with `tool`
///
/// The configure root is `source_folder` relative to the source
/// workspace. If it is missing, or the tool's commands cannot be
/// resolved, this fails before any process is started or `output_dir` is
/// created. A failing
/// configure phase yields [`Error::Configuration`], a failing build phase
/// [`Error::Build`]; both carry the tool's stderr verbatim.
pub fn invoke_build(
    tool: &dyn BuildTool,
    source: &SourceTree,
    build: &BuildSection,
    settings: &ResolvedSettings,
    output_dir: &Path,
    jobs: u32,
) -> Result<BuildOutput> {
    let source_dir = join_under(source.folder(), &build.source_folder)
        .map_err(|e| Error::Configuration(format!("Invalid source folder: {}", e)))?;

    if !source_dir.is_dir() {
        return Err(Error::Configuration(format!(
            "Source folder {} not found in {}",
            build.source_folder,
            source.folder().display()
        )));
    }

    // Commands run inside the output directory
    let absolute = |p: &Path| {
        std::path::absolute(p).map_err(|e| {
            Error::Configuration(format!("Cannot resolve {}: {}", p.display(), e))
        })
    };
    let source_dir = absolute(source_dir.as_path())?;
    let output_dir = absolute(output_dir)?;

    let request = BuildRequest {
        source_dir: &source_dir,
        output_dir: &output_dir,
        settings,
        jobs,
    };

    // Both commands are resolved before the output directory is created
    let configure = tool.configure(&request)?;
    let mut build_cmd = tool.build(&request)?;

    fs::create_dir_all(&output_dir).map_err(|e| {
        Error::Configuration(format!("Failed to create {}: {}", output_dir.display(), e))
    })?;

    let mut log = String::new();

    if let Some(mut cmd) = configure {
        cmd.envs(&build.environment);
        info!("Running configure phase ({})", tool.name());
        run_phase("configure", &mut cmd, &mut log).map_err(Error::Configuration)?;
    }

    build_cmd.envs(&build.environment);
    info!("Running build phase ({})", tool.name());
    run_phase("build", &mut build_cmd, &mut log).map_err(Error::Build)?;

    Ok(BuildOutput {
        tree: BuildOutputTree::new(output_dir),
        log,
    })
}

/// Run one phase, appending its output to `log`
///
/// Returns the failure description on error so the caller can pick the
/// error kind for the phase.
fn run_phase(phase: &str, cmd: &mut Command, log: &mut String) -> std::result::Result<(), String> {
    debug!("Command: {:?}", cmd);

    let output = cmd
        .output()
        .map_err(|e| format!("Failed to run {} phase: {}", phase, e))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    log.push_str(&format!("=== {} ===\n", phase));
    if !stdout.is_empty() {
        log.push_str(&stdout);
        log.push('\n');
    }
    if !stderr.is_empty() {
        log.push_str(&stderr);
        log.push('\n');
    }

    if !output.status.success() {
        return Err(format!(
            "{} phase failed with exit code {:?}\nstderr: {}",
            phase,
            output.status.code(),
            stderr
        ));
    }

    Ok(())
}
