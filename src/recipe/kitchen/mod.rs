// src/recipe/kitchen/mod.rs

//! Kitchen: runs a recipe's lifecycle hooks
//!
//! A hosting runtime calls the hooks one at a time, in order:
//! - [`Kitchen::source`] materializes the source tree (prep)
//! - [`Kitchen::build`] configures and builds it (simmer)
//! - [`Kitchen::package`] stages artifacts into the layout (plate)
//! - [`Kitchen::publish`] declares consumption metadata (serve), usually
//!   much later and from a different process
//!
//! [`Kitchen::cook`] runs the first three back to back. Every hook fails
//! fast and nothing is rolled back; cleaning up a failed workspace is the
//! caller's job.

mod build;
mod config;
mod info;
mod package;
mod source;

pub use build::{
    BuildOutput, BuildOutputTree, BuildRequest, BuildTool, CMakeTool, CommandTool,
    ResolvedSettings, invoke_build, setting_env_name,
};
pub use config::{CookResult, FetcherKind, KitchenConfig, Workspace};
pub use info::{ConsumptionMetadata, check_layout, publish};
pub use package::{LayoutManifest, PackageLayout, collect};
pub use source::{
    CopyFetcher, GitFetcher, SourceFetcher, SourceTree, acquire_source, unresolved_submodules,
};

use crate::error::{Error, Result};
use crate::recipe::format::{BuildToolKind, Recipe};
use std::sync::Arc;
use tracing::{info, warn};

/// The Kitchen: where recipes are cooked
pub struct Kitchen {
    pub(crate) config: KitchenConfig,
    fetcher: Arc<dyn SourceFetcher>,
}

impl Kitchen {
    /// Create a new Kitchen with the given configuration
    pub fn new(config: KitchenConfig) -> Self {
        let fetcher: Arc<dyn SourceFetcher> = match config.fetcher {
            FetcherKind::Git => Arc::new(GitFetcher::new(config.git_program.clone())),
            FetcherKind::Copy => Arc::new(CopyFetcher),
        };
        Self { config, fetcher }
    }

    /// Create a Kitchen that retrieves sources with a custom fetcher
    pub fn with_fetcher(config: KitchenConfig, fetcher: Arc<dyn SourceFetcher>) -> Self {
        Self { config, fetcher }
    }

    /// Create a Kitchen with default configuration
    pub fn with_defaults() -> Self {
        Self::new(KitchenConfig::default())
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    /// Source Acquisition into the workspace's source folder
    pub fn source(&self, recipe: &Recipe, workspace: &Workspace) -> Result<SourceTree> {
        info!("Prep: acquiring source for {}", recipe.package.name);
        acquire_source(
            self.fetcher.as_ref(),
            &recipe.source_location(),
            &workspace.source_dir(),
            recipe.source_dir_name(),
        )
    }

    /// Build Invocation into the workspace's build folder
    ///
    /// Every settings axis the recipe declares must have a value; a
    /// missing one is an [`Error::Configuration`] raised before any
    /// process starts.
    pub fn build(
        &self,
        recipe: &Recipe,
        settings: &ResolvedSettings,
        source: &SourceTree,
        workspace: &Workspace,
    ) -> Result<BuildOutput> {
        check_settings(recipe, settings)?;

        info!("Simmering: building {}", recipe.package.name);
        let tool = self.tool_for(recipe)?;
        invoke_build(
            tool.as_ref(),
            source,
            &recipe.build,
            settings,
            &workspace.build_dir(),
            self.config.jobs,
        )
    }

    /// Artifact Collection into the workspace's package folder
    pub fn package(
        &self,
        recipe: &Recipe,
        source: &SourceTree,
        output: &BuildOutputTree,
        workspace: &Workspace,
    ) -> Result<PackageLayout> {
        info!("Plating: collecting artifacts for {}", recipe.package.name);
        collect(&recipe.artifacts, source, output, &workspace.package_dir())
    }

    /// Consumption Metadata Publication for a staged layout
    pub fn publish(&self, recipe: &Recipe, layout: &PackageLayout) -> Result<ConsumptionMetadata> {
        publish(&recipe.metadata()?, &recipe.info, layout)
    }

    /// Run source, build and package in order
    pub fn cook(
        &self,
        recipe: &Recipe,
        settings: &ResolvedSettings,
        workspace: &Workspace,
    ) -> Result<CookResult> {
        let metadata = recipe.metadata()?;
        info!("Cooking {}", metadata.reference());

        check_settings(recipe, settings)?;

        let source = self.source(recipe, workspace)?;
        let output = self.build(recipe, settings, &source, workspace)?;
        let layout = self.package(recipe, &source, &output.tree, workspace)?;

        let mut warnings = Vec::new();
        if self.config.check_layout {
            let published = publish(&metadata, &recipe.info, &layout)?;
            for problem in check_layout(&published, &layout) {
                warn!("{}", problem);
                warnings.push(problem);
            }
        }

        info!(
            "Cooked {}: {} files in {}",
            metadata.reference(),
            layout.len(),
            layout.root().display()
        );

        Ok(CookResult {
            source,
            output: output.tree,
            layout,
            log: output.log,
            warnings,
        })
    }

    /// Build tool the recipe asks for
    pub fn tool_for(&self, recipe: &Recipe) -> Result<Box<dyn BuildTool>> {
        match recipe.build.tool {
            BuildToolKind::Cmake => Ok(Box::new(
                CMakeTool::new(self.config.cmake_program.clone())
                    .with_defines(recipe.build.defines.clone()),
            )),
            BuildToolKind::Command => {
                let build = recipe.build.build.clone().ok_or_else(|| {
                    Error::Configuration("Command build tool requires a build command".to_string())
                })?;
                Ok(Box::new(CommandTool::new(
                    self.config.shell_program.clone(),
                    recipe.build.configure.clone(),
                    build,
                )))
            }
        }
    }
}

fn check_settings(recipe: &Recipe, settings: &ResolvedSettings) -> Result<()> {
    let missing = settings.missing(&recipe.package.settings);
    if missing.is_empty() {
        return Ok(());
    }
    Err(Error::Configuration(format!(
        "Unresolved settings: {}",
        missing.join(", ")
    )))
}
