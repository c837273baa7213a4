// src/recipe/kitchen/config.rs

//! Configuration types for the Kitchen

use super::build::BuildOutputTree;
use super::package::PackageLayout;
use super::source::SourceTree;
use std::path::{Path, PathBuf};

/// How Source Acquisition retrieves a tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetcherKind {
    /// `git clone --recurse-submodules`
    #[default]
    Git,
    /// Recursive copy of a local directory
    Copy,
}

/// Configuration for the Kitchen
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// Source retrieval strategy
    pub fetcher: FetcherKind,
    /// git executable (name or path)
    pub git_program: String,
    /// cmake executable (name or path)
    pub cmake_program: String,
    /// Shell used by the command build tool
    pub shell_program: String,
    /// Number of parallel build jobs
    pub jobs: u32,
    /// Compare the declared consumption metadata with the staged layout
    /// after packaging and report mismatches as warnings
    pub check_layout: bool,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        let jobs = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);

        Self {
            fetcher: FetcherKind::Git,
            git_program: "git".to_string(),
            cmake_program: "cmake".to_string(),
            shell_program: "sh".to_string(),
            jobs,
            check_layout: true,
        }
    }
}

impl KitchenConfig {
    /// Configuration that copies a local source tree instead of cloning it
    pub fn with_copy_fetcher() -> Self {
        Self {
            fetcher: FetcherKind::Copy,
            ..Self::default()
        }
    }
}

/// Directory set used by one package build
///
/// Concurrent builds of the same recipe must each use their own
/// workspace; nothing here is locked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder the source tree is cloned into
    pub fn source_dir(&self) -> PathBuf {
        self.root.join("source")
    }

    /// Build output tree
    pub fn build_dir(&self) -> PathBuf {
        self.root.join("build")
    }

    /// Package layout root
    pub fn package_dir(&self) -> PathBuf {
        self.root.join("package")
    }
}

/// Result of cooking a recipe
#[derive(Debug)]
pub struct CookResult {
    /// Acquired source tree
    pub source: SourceTree,
    /// Build output tree
    pub output: BuildOutputTree,
    /// Staged package layout
    pub layout: PackageLayout,
    /// Build log (every external phase, stdout then stderr)
    pub log: String,
    /// Warnings generated during the build
    pub warnings: Vec<String>,
}
