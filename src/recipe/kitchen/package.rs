// src/recipe/kitchen/package.rs

//! Artifact Collection: stage matched files into the package layout
//!
//! Rules run in declaration order. Each rule resolves its root (the
//! source workspace or the build output tree, plus an optional `src`
//! sub-directory), walks it in sorted order and copies every file whose
//! root-relative path matches the rule's glob. Later rules overwrite
//! earlier ones at the same destination.

use crate::error::{Error, Result};
use crate::filesystem::path::{join_under, to_slash};
use crate::hash::sha256_file;
use crate::recipe::format::{ArtifactRoot, ArtifactRule};
use glob::Pattern;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::build::BuildOutputTree;
use super::source::SourceTree;

/// Staged package directory
///
/// `files` holds the layout-relative paths placed by collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    root: PathBuf,
    files: BTreeSet<PathBuf>,
}

impl PackageLayout {
    /// Empty layout rooted at `root`
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: BTreeSet::new(),
        }
    }

    /// Describe a layout already on disk (a package cache entry)
    pub fn scan(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::IoError(format!(
                "Package layout not found: {}",
                root.display()
            )));
        }

        let mut files = BTreeSet::new();
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry
                .map_err(|e| Error::IoError(format!("Failed to read {}: {}", root.display(), e)))?;
            if entry.file_type().is_dir() {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(&root) {
                files.insert(rel.to_path_buf());
            }
        }

        Ok(Self { root, files })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Layout-relative paths of staged files, sorted
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|p| p.as_path())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, rel: impl AsRef<Path>) -> bool {
        self.files.contains(rel.as_ref())
    }

    pub fn include_dir(&self) -> PathBuf {
        self.root.join("include")
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.root.join("lib")
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    /// SHA-256 of every staged file, keyed by `/`-separated path
    pub fn manifest(&self) -> Result<LayoutManifest> {
        let mut entries = BTreeMap::new();
        for rel in &self.files {
            let digest = sha256_file(&self.root.join(rel)).map_err(|e| {
                Error::IoError(format!("Failed to hash {}: {}", rel.display(), e))
            })?;
            entries.insert(to_slash(rel), digest);
        }
        Ok(LayoutManifest { entries })
    }
}

/// Content digests of a package layout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutManifest {
    pub entries: BTreeMap<String, String>,
}

impl LayoutManifest {
    /// `<sha256>  <path>` lines, sorted by path
    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|(path, digest)| format!("{}  {}\n", digest, path))
            .collect()
    }
}

/// Copy everything the rules select into `package_root`
///
/// A rule whose root does not exist, or that matches nothing, is a
/// no-op. Fails with [`Error::Packaging`] when a destination cannot be
/// written or a rule path escapes its tree.
pub fn collect(
    rules: &[ArtifactRule],
    source: &SourceTree,
    output: &BuildOutputTree,
    package_root: &Path,
) -> Result<PackageLayout> {
    fs::create_dir_all(package_root).map_err(|e| {
        Error::Packaging(format!("Failed to create {}: {}", package_root.display(), e))
    })?;

    let mut layout = PackageLayout::at(package_root);

    for (idx, rule) in rules.iter().enumerate() {
        let copied = apply_rule(rule, source, output, &mut layout)?;
        if copied == 0 {
            debug!("Rule {} ({} -> {}) matched no files", idx + 1, rule.pattern, rule.dst);
        } else {
            debug!("Rule {} ({} -> {}) copied {} files", idx + 1, rule.pattern, rule.dst, copied);
        }
    }

    info!("Staged {} files into {}", layout.len(), package_root.display());
    Ok(layout)
}

fn apply_rule(
    rule: &ArtifactRule,
    source: &SourceTree,
    output: &BuildOutputTree,
    layout: &mut PackageLayout,
) -> Result<usize> {
    let pattern = Pattern::new(&rule.pattern).map_err(|e| {
        Error::Packaging(format!("Invalid artifact pattern {}: {}", rule.pattern, e))
    })?;

    let tree = match rule.from {
        ArtifactRoot::Source => source.folder(),
        ArtifactRoot::Build => output.root(),
    };
    let base = join_under(tree, rule.src.as_deref().unwrap_or(""))
        .map_err(|e| Error::Packaging(format!("Artifact source {}: {}", rule.pattern, e)))?;
    let dst_root = join_under(&layout.root, &rule.dst)
        .map_err(|e| Error::Packaging(format!("Artifact destination {}: {}", rule.dst, e)))?;

    if !base.is_dir() {
        debug!("Artifact root {} does not exist", base.display());
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(&base).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            Error::Packaging(format!("Failed to read {}: {}", base.display(), e))
        })?;

        // Never feed the layout back into itself
        if entry.path().starts_with(&layout.root) {
            continue;
        }
        // Symlinks are followed for files, skipped for directories
        if entry.file_type().is_dir() || !entry.path().is_file() {
            continue;
        }

        let Ok(rel) = entry.path().strip_prefix(&base) else {
            continue;
        };
        if !pattern.matches(&to_slash(rel)) {
            continue;
        }

        let target_rel = if rule.keep_path {
            rel.to_path_buf()
        } else {
            PathBuf::from(entry.file_name())
        };
        let target = dst_root.join(&target_rel);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Packaging(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        fs::copy(entry.path(), &target).map_err(|e| {
            Error::Packaging(format!(
                "Failed to copy {} to {}: {}",
                entry.path().display(),
                target.display(),
                e
            ))
        })?;

        if let Ok(staged) = target.strip_prefix(&layout.root)
            && !layout.files.insert(staged.to_path_buf())
        {
            debug!("Overwrote {}", staged.display());
        }
        copied += 1;
    }

    Ok(copied)
}
