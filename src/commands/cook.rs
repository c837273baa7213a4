// src/commands/cook.rs

//! Lifecycle commands - source, build, package and cook

use super::{load, parse_settings, workspace_for};
use crate::cli::{BuildArgs, FetcherArg, RecipeArgs, WorkspaceArgs};
use anyhow::{Context, Result, bail};
use larder::recipe::{
    BuildOutputTree, FetcherKind, Kitchen, KitchenConfig, SourceTree, validate_recipe,
};
use tracing::{info, warn};

fn kitchen_config(fetcher: FetcherArg, jobs: Option<u32>) -> KitchenConfig {
    let mut config = KitchenConfig {
        fetcher: match fetcher {
            FetcherArg::Git => FetcherKind::Git,
            FetcherArg::Copy => FetcherKind::Copy,
        },
        ..Default::default()
    };
    if let Some(j) = jobs {
        config.jobs = j;
    }
    config
}

/// Acquire the source tree into the workspace
pub fn cmd_source(recipe: &RecipeArgs, workspace: &WorkspaceArgs, fetcher: FetcherArg) -> Result<()> {
    let recipe = load(recipe)?;
    validate_recipe(&recipe).with_context(|| "Recipe validation failed")?;
    let workspace = workspace_for(workspace, &recipe);

    let kitchen = Kitchen::new(kitchen_config(fetcher, None));
    let tree = kitchen
        .source(&recipe, &workspace)
        .with_context(|| format!("Failed to acquire source for {}", recipe.package.name))?;

    println!("[OK] Source ready: {}", tree.root().display());
    Ok(())
}

/// Build a previously acquired source tree
pub fn cmd_build(recipe: &RecipeArgs, workspace: &WorkspaceArgs, build: &BuildArgs) -> Result<()> {
    let recipe = load(recipe)?;
    validate_recipe(&recipe).with_context(|| "Recipe validation failed")?;
    let workspace = workspace_for(workspace, &recipe);
    let settings = parse_settings(&build.settings)?;

    let source = SourceTree::new(workspace.source_dir(), recipe.source_dir_name());
    if !source.root().is_dir() {
        bail!(
            "No source tree at {}; run `larder source` first",
            source.root().display()
        );
    }

    let kitchen = Kitchen::new(kitchen_config(FetcherArg::Git, build.jobs));
    println!("Building with {} parallel jobs...", kitchen.config().jobs);
    let output = kitchen
        .build(&recipe, &settings, &source, &workspace)
        .with_context(|| format!("Failed to build {}", recipe.package.name))?;

    println!("[OK] Build output: {}", output.tree.root().display());
    Ok(())
}

/// Collect artifacts from the workspace into the package layout
pub fn cmd_package(recipe: &RecipeArgs, workspace: &WorkspaceArgs) -> Result<()> {
    let recipe = load(recipe)?;
    validate_recipe(&recipe).with_context(|| "Recipe validation failed")?;
    let workspace = workspace_for(workspace, &recipe);

    let source = SourceTree::new(workspace.source_dir(), recipe.source_dir_name());
    let output = BuildOutputTree::new(workspace.build_dir());
    if !output.root().is_dir() {
        warn!("No build output at {}", output.root().display());
    }

    let kitchen = Kitchen::with_defaults();
    let layout = kitchen
        .package(&recipe, &source, &output, &workspace)
        .with_context(|| format!("Failed to package {}", recipe.package.name))?;

    println!("[OK] Staged {} file(s) into {}", layout.len(), layout.root().display());
    for file in layout.files() {
        println!("  - {}", file.display());
    }
    Ok(())
}

/// Acquire, build and package a recipe
pub fn cmd_cook(
    recipe: &RecipeArgs,
    workspace: &WorkspaceArgs,
    build: &BuildArgs,
    fetcher: FetcherArg,
    no_check: bool,
) -> Result<()> {
    let recipe = load(recipe)?;
    println!("Recipe: {} version {}", recipe.package.name, recipe.package.version);

    let warnings = validate_recipe(&recipe).with_context(|| "Recipe validation failed")?;
    for warning in &warnings {
        println!("Warning: {}", warning);
    }

    let workspace = workspace_for(workspace, &recipe);
    let settings = parse_settings(&build.settings)?;

    let mut config = kitchen_config(fetcher, build.jobs);
    config.check_layout = !no_check;
    let kitchen = Kitchen::new(config);

    println!(
        "Cooking in {} with {} parallel jobs...",
        workspace.root().display(),
        kitchen.config().jobs
    );

    let result = kitchen
        .cook(&recipe, &settings, &workspace)
        .with_context(|| format!("Failed to cook {}", recipe.package.name))?;

    println!("\n[COMPLETE] Packaged: {}", result.layout.root().display());
    println!("  {} file(s) staged", result.layout.len());

    if !result.warnings.is_empty() {
        println!("\nLayout warnings:");
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }

    info!(
        "Successfully cooked {} to {}",
        recipe.package.name,
        result.layout.root().display()
    );

    Ok(())
}
