// src/recipe/kitchen/info.rs

//! Consumption Metadata Publication
//!
//! What a downstream consumer links against comes from the recipe's
//! declared [`PackageInfo`], joined onto the layout root. Nothing here
//! reads the filesystem; [`check_layout`] compares the declaration with
//! what collection actually staged.

use crate::error::{Error, Result};
use crate::filesystem::path::sanitize_path;
use crate::recipe::format::PackageInfo;
use crate::recipe::metadata::MetadataRecord;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::package::PackageLayout;

/// Link and include information for one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionMetadata {
    /// Package reference (`name/version`)
    pub package: String,
    /// Absolute package layout root
    pub root: PathBuf,
    /// Libraries to link, in link order
    pub libs: Vec<String>,
    pub include_dirs: Vec<PathBuf>,
    pub lib_dirs: Vec<PathBuf>,
    pub bin_dirs: Vec<PathBuf>,
}

impl ConsumptionMetadata {
    /// `-I<dir>` for every include directory
    pub fn compile_flags(&self) -> Vec<String> {
        self.include_dirs
            .iter()
            .map(|d| format!("-I{}", d.display()))
            .collect()
    }

    /// `-L<dir>` for every library directory, then `-l<lib>` in link order
    pub fn link_flags(&self) -> Vec<String> {
        self.lib_dirs
            .iter()
            .map(|d| format!("-L{}", d.display()))
            .chain(self.libs.iter().map(|l| format!("-l{}", l)))
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Declare consumption metadata for a staged layout
///
/// Directories are taken from `info` and joined onto the layout root.
/// Fails with [`Error::Packaging`] if a declared directory escapes the
/// layout.
pub fn publish(
    metadata: &MetadataRecord,
    info: &PackageInfo,
    layout: &PackageLayout,
) -> Result<ConsumptionMetadata> {
    let root = std::path::absolute(layout.root()).map_err(|e| {
        Error::Packaging(format!("Cannot resolve {}: {}", layout.root().display(), e))
    })?;

    let dirs = |declared: &[String]| -> Result<Vec<PathBuf>> {
        declared
            .iter()
            .map(|d| {
                sanitize_path(d)
                    .map(|rel| root.join(rel))
                    .map_err(|e| Error::Packaging(format!("Declared directory {}: {}", d, e)))
            })
            .collect()
    };

    Ok(ConsumptionMetadata {
        package: metadata.reference(),
        include_dirs: dirs(&info.include_dirs)?,
        lib_dirs: dirs(&info.lib_dirs)?,
        bin_dirs: dirs(&info.bin_dirs)?,
        libs: info.libs.clone(),
        root,
    })
}

/// Compare declared metadata against the files collection staged
///
/// Returns one message per mismatch: an include directory with nothing
/// under it, or a library with no file in any lib/bin directory under a
/// known naming convention.
pub fn check_layout(meta: &ConsumptionMetadata, layout: &PackageLayout) -> Vec<String> {
    let relative = |dir: &Path| dir.strip_prefix(&meta.root).map(Path::to_path_buf).ok();
    let mut problems = Vec::new();

    for dir in &meta.include_dirs {
        let populated = relative(dir.as_path())
            .map(|rel| layout.files().any(|f| f.starts_with(&rel)))
            .unwrap_or(false);
        if !populated {
            problems.push(format!("Include directory {} is empty", dir.display()));
        }
    }

    let search: Vec<PathBuf> = meta
        .lib_dirs
        .iter()
        .chain(&meta.bin_dirs)
        .filter_map(|d| relative(d.as_path()))
        .collect();

    for lib in &meta.libs {
        let found = layout.files().any(|f| {
            let in_dir = f.parent().is_some_and(|p| search.iter().any(|d| d == p));
            let name = f.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            in_dir && is_library_file(lib, &name)
        });
        if !found {
            problems.push(format!("Library {} has no file in the package", lib));
        }
    }

    problems
}

/// Whether `file` is a build of library `lib` on some platform
fn is_library_file(lib: &str, file: &str) -> bool {
    const EXTENSIONS: [&str; 4] = ["a", "lib", "dylib", "dll"];

    [lib.to_string(), format!("lib{}", lib)].iter().any(|stem| {
        EXTENSIONS
            .iter()
            .any(|ext| file == format!("{}.{}", stem, ext))
            || file == format!("{}.so", stem)
            || file.starts_with(&format!("{}.so.", stem))
    })
}
