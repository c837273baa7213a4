// src/recipe/format.rs

//! Recipe file format definitions
//!
//! Recipes are TOML files that describe where a library's source lives,
//! how to drive its build system, which build outputs make up the package,
//! and what a consumer has to link against.

use crate::error::Result;
use crate::recipe::metadata::MetadataRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A complete, resolved recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Package metadata
    pub package: PackageSection,

    /// Where the source tree comes from
    pub source: SourceSection,

    /// Build system invocation
    #[serde(default)]
    pub build: BuildSection,

    /// Ordered artifact rules
    #[serde(default)]
    pub artifacts: Vec<ArtifactRule>,

    /// What consumers link against
    #[serde(default)]
    pub info: PackageInfo,
}

impl Recipe {
    /// Build the validated metadata record for this recipe
    pub fn metadata(&self) -> Result<MetadataRecord> {
        MetadataRecord::new(self.package.clone())
    }

    /// Where Source Acquisition should fetch from
    pub fn source_location(&self) -> SourceLocation {
        SourceLocation {
            remote: self.source.git.clone().filter(|s| !s.is_empty()),
            local_override: self.source.local.clone().filter(|s| !s.is_empty()),
        }
    }

    /// Directory name the source tree is cloned into
    pub fn source_dir_name(&self) -> &str {
        self.source
            .dir
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.package.name)
    }
}

/// Package metadata section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSection {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// License identifier (SPDX)
    #[serde(default)]
    pub license: Option<String>,

    /// Author and contact
    #[serde(default)]
    pub author: Option<String>,

    /// Recipe origin URL
    #[serde(default)]
    pub url: Option<String>,

    /// Homepage URL
    #[serde(default)]
    pub homepage: Option<String>,

    /// Full description
    #[serde(default)]
    pub description: Option<String>,

    /// Classification tags
    #[serde(default)]
    pub topics: Vec<String>,

    /// Settings axes the hosting runtime must resolve before building
    ///
    /// Example: `["os", "compiler", "build_type", "arch"]`
    #[serde(default)]
    pub settings: Vec<String>,
}

/// Source location section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSection {
    /// Remote repository URL
    #[serde(default)]
    pub git: Option<String>,

    /// Local working tree used instead of the remote URL
    ///
    /// An empty string means no override, so a template can resolve it
    /// to nothing and fall back to `git`.
    #[serde(default)]
    pub local: Option<String>,

    /// Directory name to clone into (defaults to the package name)
    #[serde(default)]
    pub dir: Option<String>,
}

/// A resolved source origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Remote repository URL
    pub remote: Option<String>,
    /// Local path that takes precedence over `remote`
    pub local_override: Option<String>,
}

impl SourceLocation {
    /// Location with only a remote URL
    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            remote: Some(url.into()),
            local_override: None,
        }
    }

    /// Location with a local override
    pub fn local(path: impl Into<String>) -> Self {
        Self {
            remote: None,
            local_override: Some(path.into()),
        }
    }

    /// The origin actually used for retrieval
    pub fn origin(&self) -> Option<&str> {
        self.local_override.as_deref().or(self.remote.as_deref())
    }
}

/// Which external build system drives the build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildToolKind {
    /// CMake configure + build
    #[default]
    Cmake,
    /// Arbitrary shell commands
    Command,
}

/// Build invocation section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSection {
    /// Build system to invoke
    #[serde(default)]
    pub tool: BuildToolKind,

    /// Folder inside the source workspace where configuration is rooted
    #[serde(default = "default_source_folder")]
    pub source_folder: String,

    /// Extra `-D` definitions (cmake only)
    #[serde(default)]
    pub defines: BTreeMap<String, String>,

    /// Configure command (command tool only)
    #[serde(default)]
    pub configure: Option<String>,

    /// Build command (command tool only)
    #[serde(default)]
    pub build: Option<String>,

    /// Environment variables for every build phase
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

fn default_source_folder() -> String {
    ".".to_string()
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            tool: BuildToolKind::default(),
            source_folder: default_source_folder(),
            defines: BTreeMap::new(),
            configure: None,
            build: None,
            environment: BTreeMap::new(),
        }
    }
}

/// Tree an artifact rule selects files from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactRoot {
    /// The acquired source workspace
    Source,
    /// The build output tree
    #[default]
    Build,
}

/// One artifact selection rule
///
/// `pattern` is a shell glob matched against paths relative to the rule's
/// root (`from` + `src`). With `keep_path = false` only the file name is
/// kept under `dst`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRule {
    /// Glob pattern
    pub pattern: String,

    /// Destination directory inside the package layout
    pub dst: String,

    /// Sub-directory of the root to match under
    #[serde(default)]
    pub src: Option<String>,

    /// Root tree to match under
    #[serde(default)]
    pub from: ArtifactRoot,

    /// Preserve the path relative to the rule's root
    #[serde(default = "default_keep_path")]
    pub keep_path: bool,
}

fn default_keep_path() -> bool {
    true
}

impl ArtifactRule {
    /// Rule matching under the build output tree
    pub fn new(pattern: impl Into<String>, dst: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            dst: dst.into(),
            src: None,
            from: ArtifactRoot::Build,
            keep_path: true,
        }
    }

    /// Match under `src` inside the source workspace
    pub fn from_source(mut self, src: impl Into<String>) -> Self {
        self.from = ArtifactRoot::Source;
        self.src = Some(src.into());
        self
    }

    /// Match under `src` inside the build output tree
    pub fn from_build(mut self, src: impl Into<String>) -> Self {
        self.from = ArtifactRoot::Build;
        self.src = Some(src.into());
        self
    }

    /// Drop intermediate directories when copying
    pub fn flatten(mut self) -> Self {
        self.keep_path = false;
        self
    }
}

/// Consumption metadata declared by the recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Libraries a consumer links, in link order
    #[serde(default)]
    pub libs: Vec<String>,

    /// Include directories relative to the package root
    #[serde(default = "default_include_dirs")]
    pub include_dirs: Vec<String>,

    /// Library directories relative to the package root
    #[serde(default = "default_lib_dirs")]
    pub lib_dirs: Vec<String>,

    /// Binary directories relative to the package root
    #[serde(default = "default_bin_dirs")]
    pub bin_dirs: Vec<String>,
}

fn default_include_dirs() -> Vec<String> {
    vec!["include".to_string()]
}

fn default_lib_dirs() -> Vec<String> {
    vec!["lib".to_string()]
}

fn default_bin_dirs() -> Vec<String> {
    vec!["bin".to_string()]
}

impl Default for PackageInfo {
    fn default() -> Self {
        Self {
            libs: Vec::new(),
            include_dirs: default_include_dirs(),
            lib_dirs: default_lib_dirs(),
            bin_dirs: default_bin_dirs(),
        }
    }
}
