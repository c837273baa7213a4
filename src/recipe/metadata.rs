// src/recipe/metadata.rs

//! Recipe metadata and template resolution
//!
//! A recipe is declared as a template: any string value or table key may
//! carry `@IDENT@` placeholders that the hosting runtime fills in (typically the
//! project name, version, and a local source directory). Resolution
//! happens exactly once, before any lifecycle hook runs, and yields the
//! immutable [`MetadataRecord`] plus the rest of the [`Recipe`].

use crate::error::{Error, Result};
use crate::recipe::format::{PackageSection, Recipe};
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::LazyLock;
use tracing::debug;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@([A-Za-z_][A-Za-z0-9_]*)@").expect("placeholder pattern must compile")
});

/// Validated, read-only package metadata
///
/// `name` and `version` form the identity key the hosting runtime uses
/// for caching; both are non-empty for the lifetime of the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    #[serde(flatten)]
    section: PackageSection,
}

impl MetadataRecord {
    /// Validate a declared package section
    ///
    /// Fails with [`Error::InvalidMetadata`] when `name` or `version` is
    /// empty or contains whitespace, or when a settings axis is empty or
    /// declared twice. Duplicate topics are dropped, keeping the first.
    pub fn new(mut section: PackageSection) -> Result<Self> {
        check_identifier("name", &section.name)?;
        check_identifier("version", &section.version)?;

        let mut seen = HashSet::new();
        for axis in &section.settings {
            if axis.trim().is_empty() {
                return Err(Error::InvalidMetadata(
                    "settings axis name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(axis.as_str()) {
                return Err(Error::InvalidMetadata(format!(
                    "duplicate settings axis: {}",
                    axis
                )));
            }
        }

        let mut topics = HashSet::new();
        section.topics.retain(|t| topics.insert(t.clone()));

        Ok(Self { section })
    }

    pub fn name(&self) -> &str {
        &self.section.name
    }

    pub fn version(&self) -> &str {
        &self.section.version
    }

    pub fn license(&self) -> Option<&str> {
        self.section.license.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.section.author.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.section.url.as_deref()
    }

    pub fn homepage(&self) -> Option<&str> {
        self.section.homepage.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.section.description.as_deref()
    }

    pub fn topics(&self) -> &[String] {
        &self.section.topics
    }

    /// Settings axes in declaration order
    pub fn settings(&self) -> &[String] {
        &self.section.settings
    }

    /// Package reference (`name/version`)
    pub fn reference(&self) -> String {
        format!("{}/{}", self.section.name, self.section.version)
    }
}

fn check_identifier(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidMetadata(format!(
            "package {} cannot be empty",
            field
        )));
    }
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(Error::InvalidMetadata(format!(
            "package {} contains whitespace: {:?}",
            field, value
        )));
    }
    if PLACEHOLDER.is_match(value) {
        return Err(Error::InvalidMetadata(format!(
            "package {} has an unresolved placeholder: {}",
            field, value
        )));
    }
    Ok(())
}

/// An unresolved recipe declaration
#[derive(Debug, Clone)]
pub struct RecipeTemplate {
    value: toml::Value,
}

impl RecipeTemplate {
    /// Parse template text (must be valid TOML)
    pub fn parse(content: &str) -> Result<Self> {
        let value: toml::Value = toml::from_str(content)
            .map_err(|e| Error::ParseError(format!("Invalid recipe: {}", e)))?;
        Ok(Self { value })
    }

    /// Placeholder names referenced anywhere in the template
    pub fn placeholders(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        collect_placeholders(&self.value, &mut names);
        names
    }

    /// Substitute every placeholder and produce the resolved recipe
    ///
    /// Unknown placeholders fail with [`Error::InvalidMetadata`]; the
    /// resolved metadata is validated before returning.
    pub fn resolve(&self, vars: &BTreeMap<String, String>) -> Result<Recipe> {
        let mut value = self.value.clone();
        let mut missing = BTreeSet::new();
        substitute_value(&mut value, vars, &mut missing);

        if !missing.is_empty() {
            let names: Vec<_> = missing.into_iter().collect();
            return Err(Error::InvalidMetadata(format!(
                "unresolved placeholders: {}",
                names.join(", ")
            )));
        }

        let recipe: Recipe = value
            .try_into()
            .map_err(|e| Error::ParseError(format!("Invalid recipe: {}", e)))?;

        recipe.metadata()?;
        debug!(
            "Resolved recipe template for {} {}",
            recipe.package.name, recipe.package.version
        );
        Ok(recipe)
    }
}

fn scan_placeholders(s: &str, names: &mut BTreeSet<String>) {
    for caps in PLACEHOLDER.captures_iter(s) {
        names.insert(caps[1].to_string());
    }
}

fn collect_placeholders(value: &toml::Value, names: &mut BTreeSet<String>) {
    match value {
        toml::Value::String(s) => scan_placeholders(s, names),
        toml::Value::Array(items) => {
            for item in items {
                collect_placeholders(item, names);
            }
        }
        toml::Value::Table(table) => {
            for (key, item) in table {
                scan_placeholders(key, names);
                collect_placeholders(item, names);
            }
        }
        _ => {}
    }
}

fn substitute_str(
    s: &str,
    vars: &BTreeMap<String, String>,
    missing: &mut BTreeSet<String>,
) -> String {
    PLACEHOLDER
        .replace_all(s, |caps: &Captures| match vars.get(&caps[1]) {
            Some(v) => v.clone(),
            None => {
                missing.insert(caps[1].to_string());
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn substitute_value(
    value: &mut toml::Value,
    vars: &BTreeMap<String, String>,
    missing: &mut BTreeSet<String>,
) {
    match value {
        toml::Value::String(s) => {
            *s = substitute_str(s, vars, missing);
        }
        toml::Value::Array(items) => {
            for item in items {
                substitute_value(item, vars, missing);
            }
        }
        toml::Value::Table(table) => {
            // Keys may carry placeholders too, so the table is rebuilt
            for (key, mut item) in std::mem::take(table) {
                substitute_value(&mut item, vars, missing);
                table.insert(substitute_str(&key, vars, missing), item);
            }
        }
        _ => {}
    }
}
