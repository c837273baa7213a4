// src/filesystem/path.rs

//! Path sanitization for recipe-declared paths
//!
//! Artifact rule destinations, rule source sub-directories and the build
//! source folder all come from the recipe. They must stay inside the tree
//! they are joined onto.

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Normalize a recipe-declared relative path
///
/// - `..` components are rejected
/// - `.` components are dropped
/// - leading slashes are stripped, so `/include` means `include`
/// - a path that normalizes to nothing is rejected
///
/// ```
/// use larder::filesystem::path::sanitize_path;
/// use std::path::PathBuf;
///
/// assert_eq!(sanitize_path("include/mylib").unwrap(), PathBuf::from("include/mylib"));
/// assert_eq!(sanitize_path("/lib").unwrap(), PathBuf::from("lib"));
/// assert!(sanitize_path("../outside").is_err());
/// ```
pub fn sanitize_path(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();
    let relative = path_str.trim_start_matches('/');

    let mut normalized = PathBuf::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(c) => normalized.push(c),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(Error::PathTraversal(path_str.to_string()));
            }
            // Windows drive prefixes and root markers carry no location
            Component::Prefix(_) | Component::RootDir => {}
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(Error::InvalidPath(format!(
            "{:?} is empty after normalization",
            path_str
        )));
    }

    Ok(normalized)
}

/// Join a recipe-declared path under `root`
///
/// An empty path or `.` yields `root` itself.
pub fn join_under(root: &Path, path: &str) -> Result<PathBuf> {
    if path.is_empty() || path == "." {
        return Ok(root.to_path_buf());
    }
    Ok(root.join(sanitize_path(path)?))
}

/// Render a relative path with `/` separators on every platform
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_normal() {
        assert_eq!(
            sanitize_path("include/headcode/url").unwrap(),
            PathBuf::from("include/headcode/url")
        );
        assert_eq!(sanitize_path("./lib").unwrap(), PathBuf::from("lib"));
        assert_eq!(sanitize_path("///bin").unwrap(), PathBuf::from("bin"));
    }

    #[test]
    fn test_sanitize_path_traversal_rejected() {
        assert!(matches!(sanitize_path(".."), Err(Error::PathTraversal(_))));
        assert!(sanitize_path("include/../../etc").is_err());
        assert!(sanitize_path("/lib/../..").is_err());
    }

    #[test]
    fn test_sanitize_path_empty_rejected() {
        assert!(matches!(sanitize_path(""), Err(Error::InvalidPath(_))));
        assert!(sanitize_path("/").is_err());
        assert!(sanitize_path("./").is_err());
    }

    #[test]
    fn test_join_under() {
        let root = Path::new("/pkg");
        assert_eq!(join_under(root, "").unwrap(), PathBuf::from("/pkg"));
        assert_eq!(join_under(root, ".").unwrap(), PathBuf::from("/pkg"));
        assert_eq!(join_under(root, "include").unwrap(), PathBuf::from("/pkg/include"));
        assert!(join_under(root, "../escape").is_err());
    }

    #[test]
    fn test_to_slash() {
        let path: PathBuf = ["sub", "dir", "b.hpp"].iter().collect();
        assert_eq!(to_slash(&path), "sub/dir/b.hpp");
    }
}
