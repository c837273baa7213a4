// src/recipe/kitchen/source.rs

//! Source Acquisition: materialize a recipe's source tree on disk

use crate::error::{Error, Result};
use crate::recipe::format::SourceLocation;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};
use walkdir::WalkDir;

/// A fully materialized source tree
///
/// `folder` is the source workspace the tree was cloned into; the tree
/// itself lives at `folder/dir_name`. Recipe paths (artifact rule `src`,
/// the build `source_folder`) are relative to `folder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTree {
    folder: PathBuf,
    dir_name: String,
}

impl SourceTree {
    /// Refer to a tree that is already on disk
    pub fn new(folder: impl Into<PathBuf>, dir_name: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            dir_name: dir_name.into(),
        }
    }

    /// Source workspace containing the tree
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Root of the cloned tree
    pub fn root(&self) -> PathBuf {
        self.folder.join(&self.dir_name)
    }

    pub fn dir_name(&self) -> &str {
        &self.dir_name
    }
}

/// Something that can materialize a tree from an origin
pub trait SourceFetcher: Send + Sync {
    /// Retrieve `origin` into `dest`, including nested sub-trees
    ///
    /// `dest` does not exist or is empty when this is called.
    fn fetch(&self, origin: &str, dest: &Path) -> Result<()>;
}

/// Clones with git, recursing into submodules
#[derive(Debug, Clone)]
pub struct GitFetcher {
    program: String,
}

impl GitFetcher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn git(&self) -> Result<PathBuf> {
        which::which(&self.program).map_err(|e| {
            Error::SourceRetrieval(format!("{} not found in PATH: {}", self.program, e))
        })
    }
}

impl Default for GitFetcher {
    fn default() -> Self {
        Self::new("git")
    }
}

impl SourceFetcher for GitFetcher {
    fn fetch(&self, origin: &str, dest: &Path) -> Result<()> {
        let git = self.git()?;

        info!("Cloning {} into {}", origin, dest.display());
        let output = Command::new(&git)
            .args(["clone", "--recurse-submodules", origin])
            .arg(dest)
            .output()
            .map_err(|e| Error::SourceRetrieval(format!("Failed to run git clone: {}", e)))?;

        if !output.status.success() {
            return Err(Error::SourceRetrieval(format!(
                "git clone of {} failed with exit code {:?}\nstderr: {}",
                origin,
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let status = Command::new(&git)
            .args(["submodule", "status", "--recursive"])
            .current_dir(dest)
            .output()
            .map_err(|e| Error::SourceRetrieval(format!("Failed to run git submodule: {}", e)))?;

        if !status.status.success() {
            return Err(Error::SourceRetrieval(format!(
                "git submodule status failed in {}\nstderr: {}",
                dest.display(),
                String::from_utf8_lossy(&status.stderr)
            )));
        }

        let unresolved = unresolved_submodules(&String::from_utf8_lossy(&status.stdout));
        if !unresolved.is_empty() {
            return Err(Error::SourceRetrieval(format!(
                "Unresolved submodules in {}: {}",
                origin,
                unresolved.join(", ")
            )));
        }

        Ok(())
    }
}

/// Submodule paths that `git submodule status` reports as not checked out
///
/// A leading `-` marks an uninitialized submodule, `U` a merge conflict.
pub fn unresolved_submodules(status: &str) -> Vec<String> {
    status
        .lines()
        .filter(|line| line.starts_with('-') || line.starts_with('U'))
        .filter_map(|line| line[1..].split_whitespace().nth(1))
        .map(|path| path.to_string())
        .collect()
}

/// Copies a local directory tree verbatim
///
/// Only local origins are supported; this is for building from an
/// exported source directory that is not a git repository.
#[derive(Debug, Clone, Default)]
pub struct CopyFetcher;

impl SourceFetcher for CopyFetcher {
    fn fetch(&self, origin: &str, dest: &Path) -> Result<()> {
        let origin_path = Path::new(origin);
        if !origin_path.is_dir() {
            return Err(Error::SourceRetrieval(format!(
                "Copy fetcher needs a local directory, got {}",
                origin
            )));
        }

        info!("Copying {} into {}", origin, dest.display());
        for entry in WalkDir::new(origin_path).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                Error::SourceRetrieval(format!("Failed to read {}: {}", origin, e))
            })?;
            let rel = entry
                .path()
                .strip_prefix(origin_path)
                .map_err(|e| Error::SourceRetrieval(e.to_string()))?;
            let target = dest.join(rel);

            let copied = if entry.file_type().is_dir() {
                fs::create_dir_all(&target)
            } else if entry.file_type().is_symlink() {
                copy_symlink(entry.path(), &target)
            } else {
                fs::copy(entry.path(), &target).map(|_| ())
            };
            copied.map_err(|e| {
                Error::SourceRetrieval(format!("Failed to copy {}: {}", entry.path().display(), e))
            })?;
        }

        Ok(())
    }
}

/// Recreate a link as-is, so directory and dangling links survive
#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(link)?, target)
}

/// Copy what a link points at; directory links become empty directories
/// and their contents are not followed
#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> std::io::Result<()> {
    if link.is_dir() {
        fs::create_dir_all(target)
    } else {
        fs::copy(link, target).map(|_| ())
    }
}

/// Materialize the source tree for `location` at `folder/dir_name`
///
/// Fails with [`Error::SourceRetrieval`] if `dir_name` is not a single
/// path component, if the local override does not exist, if the
/// destination already exists and is not empty, or if the fetcher fails. A missing local override is detected before anything
/// is written. Partial trees left by a failed fetch are not removed; the
/// caller owns that cleanup.
pub fn acquire_source(
    fetcher: &dyn SourceFetcher,
    location: &SourceLocation,
    folder: &Path,
    dir_name: &str,
) -> Result<SourceTree> {
    let origin = location.origin().ok_or_else(|| {
        Error::SourceRetrieval("No source location (neither local nor remote)".to_string())
    })?;

    let mut components = Path::new(dir_name).components();
    if !matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) {
        return Err(Error::SourceRetrieval(format!(
            "Source directory must be a single name: {:?}",
            dir_name
        )));
    }

    if let Some(local) = &location.local_override {
        let local_path = Path::new(local);
        if !local_path.exists() {
            return Err(Error::SourceRetrieval(format!(
                "Local source override does not exist: {}",
                local
            )));
        }
        debug!("Using local source override: {}", local);
    }

    let dest = folder.join(dir_name);
    if dest.exists() {
        if !dest.is_dir() {
            return Err(Error::SourceRetrieval(format!(
                "Destination exists and is not a directory: {}",
                dest.display()
            )));
        }
        let mut entries = fs::read_dir(&dest).map_err(|e| {
            Error::SourceRetrieval(format!("Failed to read {}: {}", dest.display(), e))
        })?;
        if entries.next().is_some() {
            return Err(Error::SourceRetrieval(format!(
                "Destination is not empty: {}",
                dest.display()
            )));
        }
    }

    fs::create_dir_all(folder).map_err(|e| {
        Error::SourceRetrieval(format!("Failed to create {}: {}", folder.display(), e))
    })?;

    fetcher.fetch(origin, &dest)?;

    if !dest.is_dir() {
        return Err(Error::SourceRetrieval(format!(
            "Fetching {} produced no tree at {}",
            origin,
            dest.display()
        )));
    }

    info!("Source ready: {}", dest.display());
    Ok(SourceTree::new(folder, dir_name))
}
