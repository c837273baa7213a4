// src/recipe/parser.rs

//! Recipe file parsing and validation

use crate::error::{Error, Result};
use crate::filesystem::path::sanitize_path;
use crate::recipe::format::{BuildToolKind, Recipe};
use crate::recipe::metadata::RecipeTemplate;
use std::collections::BTreeMap;
use std::path::Path;

/// Parse an already-resolved recipe from a TOML string
pub fn parse_recipe(content: &str) -> Result<Recipe> {
    toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid recipe: {}", e)))
}

/// Parse an already-resolved recipe from a file
pub fn parse_recipe_file(path: &Path) -> Result<Recipe> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("Failed to read recipe file: {}", e)))?;

    parse_recipe(&content)
}

/// Read a recipe template and resolve its placeholders
pub fn load_recipe(path: &Path, vars: &BTreeMap<String, String>) -> Result<Recipe> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("Failed to read recipe file: {}", e)))?;

    RecipeTemplate::parse(&content)?.resolve(vars)
}

/// Validate a recipe for completeness and correctness
///
/// Hard errors come back as [`Error::InvalidMetadata`]; softer issues are
/// returned as warnings.
pub fn validate_recipe(recipe: &Recipe) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    recipe.metadata()?;

    if recipe.source_location().origin().is_none() {
        return Err(Error::InvalidMetadata(
            "Recipe source needs a git URL or a local path".to_string(),
        ));
    }

    let dir_name = recipe.source_dir_name();
    if dir_name.contains('/') || dir_name.contains('\\') || dir_name == ".." || dir_name == "." {
        return Err(Error::InvalidMetadata(format!(
            "Source directory must be a single name: {}",
            dir_name
        )));
    }

    if recipe.build.source_folder != "." {
        sanitize_path(&recipe.build.source_folder).map_err(|e| {
            Error::InvalidMetadata(format!("Invalid build source_folder: {}", e))
        })?;
    }

    match recipe.build.tool {
        BuildToolKind::Command => {
            if recipe.build.build.is_none() {
                return Err(Error::InvalidMetadata(
                    "Command build tool requires a build command".to_string(),
                ));
            }
        }
        BuildToolKind::Cmake => {
            if recipe.build.configure.is_some() || recipe.build.build.is_some() {
                warnings.push("configure/build commands are ignored by the cmake tool".to_string());
            }
        }
    }

    for (idx, rule) in recipe.artifacts.iter().enumerate() {
        if rule.pattern.is_empty() {
            return Err(Error::InvalidMetadata(format!(
                "Artifact rule {} has an empty pattern",
                idx + 1
            )));
        }
        glob::Pattern::new(&rule.pattern).map_err(|e| {
            Error::InvalidMetadata(format!(
                "Artifact rule {} has an invalid pattern {}: {}",
                idx + 1,
                rule.pattern,
                e
            ))
        })?;
        if !rule.dst.is_empty() && rule.dst != "." {
            sanitize_path(&rule.dst).map_err(|e| {
                Error::InvalidMetadata(format!("Artifact rule {} destination: {}", idx + 1, e))
            })?;
        }
        if let Some(src) = &rule.src
            && !src.is_empty()
        {
            sanitize_path(src).map_err(|e| {
                Error::InvalidMetadata(format!("Artifact rule {} source: {}", idx + 1, e))
            })?;
        }
    }

    if recipe.package.license.is_none() {
        warnings.push("Missing package license".to_string());
    }
    if recipe.package.description.is_none() {
        warnings.push("Missing package description".to_string());
    }
    if recipe.artifacts.is_empty() {
        warnings.push("No artifact rules; the package will be empty".to_string());
    }
    if recipe.info.libs.is_empty() {
        warnings.push("No libraries declared for consumers".to_string());
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
[package]
name = "mylib"
version = "1.0"
license = "MIT"
description = "A library"
settings = ["os", "build_type"]

[source]
git = "https://example.com/mylib.git"

[build]
source_folder = "mylib"

[[artifacts]]
pattern = "*.hpp"
dst = "include"
src = "mylib/include"
from = "source"

[info]
libs = ["mylib"]
include_dirs = ["include/mylib"]
"#;

    #[test]
    fn test_parse_valid_recipe() {
        let recipe = parse_recipe(VALID).unwrap();
        assert_eq!(recipe.package.name, "mylib");
        let warnings = validate_recipe(&recipe).unwrap();
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    }

    #[test]
    fn test_parse_invalid_recipe() {
        let content = "this is not valid toml at all {}";
        assert!(matches!(parse_recipe(content), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_validate_empty_name() {
        let recipe = parse_recipe(&VALID.replace("name = \"mylib\"", "name = \"\"")).unwrap();
        assert!(matches!(validate_recipe(&recipe), Err(Error::InvalidMetadata(_))));
    }

    #[test]
    fn test_validate_missing_origin() {
        let recipe = parse_recipe(&VALID.replace(
            "git = \"https://example.com/mylib.git\"",
            "local = \"\"",
        ))
        .unwrap();
        assert!(matches!(validate_recipe(&recipe), Err(Error::InvalidMetadata(_))));
    }

    #[test]
    fn test_validate_escaping_destination() {
        let recipe = parse_recipe(&VALID.replace("dst = \"include\"", "dst = \"../outside\"")).unwrap();
        let err = validate_recipe(&recipe).unwrap_err();
        assert!(err.to_string().contains("destination"));
    }

    #[test]
    fn test_validate_bad_pattern() {
        let recipe = parse_recipe(&VALID.replace("pattern = \"*.hpp\"", "pattern = \"[*.hpp\"")).unwrap();
        assert!(matches!(validate_recipe(&recipe), Err(Error::InvalidMetadata(_))));
    }

    #[test]
    fn test_validate_command_tool_without_build() {
        let recipe = parse_recipe(&VALID.replace(
            "source_folder = \"mylib\"",
            "source_folder = \"mylib\"\ntool = \"command\"",
        ))
        .unwrap();
        assert!(matches!(validate_recipe(&recipe), Err(Error::InvalidMetadata(_))));
    }

    #[test]
    fn test_validate_warnings() {
        let content = r#"
[package]
name = "test"
version = "1.0"

[source]
git = "https://example.com/test.git"
"#;

        let recipe = parse_recipe(content).unwrap();
        let warnings = validate_recipe(&recipe).unwrap();
        assert!(warnings.iter().any(|w| w.contains("license")));
        assert!(warnings.iter().any(|w| w.contains("description")));
        assert!(warnings.iter().any(|w| w.contains("artifact rules")));
        assert!(warnings.iter().any(|w| w.contains("libraries")));
    }

    #[test]
    fn test_load_recipe_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipe.toml");
        std::fs::write(&path, VALID.replace("\"mylib\"", "\"@NAME@\"")).unwrap();

        let vars = BTreeMap::from([("NAME".to_string(), "mylib".to_string())]);
        let recipe = load_recipe(&path, &vars).unwrap();
        assert_eq!(recipe.package.name, "mylib");
        assert_eq!(recipe.info.libs, vec!["mylib"]);
    }
}
