// src/commands/recipe.rs

//! Recipe inspection commands - validate, info and publish

use super::{load, workspace_for};
use crate::cli::{RecipeArgs, WorkspaceArgs};
use anyhow::{Context, Result};
use larder::recipe::{Kitchen, PackageLayout, check_layout, validate_recipe};

/// Validate a recipe and report warnings
pub fn cmd_validate(recipe: &RecipeArgs) -> Result<()> {
    let recipe = load(recipe)?;
    let warnings = validate_recipe(&recipe).with_context(|| "Recipe validation failed")?;

    for warning in &warnings {
        println!("Warning: {}", warning);
    }

    println!("Recipe validation passed");
    if warnings.is_empty() {
        println!("[OK] No issues found");
    } else {
        println!("[OK] {} warning(s)", warnings.len());
    }
    Ok(())
}

/// Print the metadata record
pub fn cmd_info(recipe: &RecipeArgs) -> Result<()> {
    let recipe = load(recipe)?;
    let metadata = recipe.metadata()?;

    println!("Package: {}", metadata.reference());
    if let Some(license) = metadata.license() {
        println!("  License: {}", license);
    }
    if let Some(author) = metadata.author() {
        println!("  Author: {}", author);
    }
    if let Some(homepage) = metadata.homepage() {
        println!("  Homepage: {}", homepage);
    }
    if let Some(url) = metadata.url() {
        println!("  URL: {}", url);
    }
    if let Some(description) = metadata.description() {
        println!("  Description: {}", description);
    }
    if !metadata.topics().is_empty() {
        println!("  Topics: {}", metadata.topics().join(", "));
    }
    if !metadata.settings().is_empty() {
        println!("  Settings: {}", metadata.settings().join(", "));
    }

    let location = recipe.source_location();
    if let Some(origin) = location.origin() {
        println!("  Source: {}", origin);
    }
    println!("  Artifact rules: {}", recipe.artifacts.len());
    Ok(())
}

/// Print consumption metadata for a packaged workspace
pub fn cmd_publish(recipe: &RecipeArgs, workspace: &WorkspaceArgs, json: bool) -> Result<()> {
    let recipe = load(recipe)?;
    let workspace = workspace_for(workspace, &recipe);

    let layout = PackageLayout::scan(workspace.package_dir())
        .with_context(|| format!("No package layout for {}", recipe.package.name))?;

    let kitchen = Kitchen::with_defaults();
    let published = kitchen
        .publish(&recipe, &layout)
        .with_context(|| format!("Failed to publish {}", recipe.package.name))?;

    if json {
        println!("{}", published.to_json()?);
        return Ok(());
    }

    println!("Package: {}", published.package);
    println!("  Libraries: {}", published.libs.join(" "));
    println!("  Compile flags: {}", published.compile_flags().join(" "));
    println!("  Link flags: {}", published.link_flags().join(" "));

    for problem in check_layout(&published, &layout) {
        println!("Warning: {}", problem);
    }
    Ok(())
}
