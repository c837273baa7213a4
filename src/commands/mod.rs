// src/commands/mod.rs
//! Command handlers for the larder CLI

mod cook;
mod recipe;

pub use cook::{cmd_build, cmd_cook, cmd_package, cmd_source};
pub use recipe::{cmd_info, cmd_publish, cmd_validate};

use crate::cli::{RecipeArgs, WorkspaceArgs};
use anyhow::{Context, Result, bail};
use larder::recipe::{Recipe, ResolvedSettings, Workspace, load_recipe};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Parse `KEY=VALUE` template variables
fn parse_defines(defines: &[String]) -> Result<BTreeMap<String, String>> {
    let mut vars = BTreeMap::new();
    for define in defines {
        let Some((key, value)) = define.split_once('=') else {
            bail!("Invalid define {:?}, expected KEY=VALUE", define);
        };
        vars.insert(key.trim().to_string(), value.to_string());
    }
    Ok(vars)
}

/// Read the recipe and resolve its template variables
fn load(args: &RecipeArgs) -> Result<Recipe> {
    let path = Path::new(&args.recipe);
    let vars = parse_defines(&args.defines)?;
    load_recipe(path, &vars).with_context(|| format!("Failed to load recipe: {}", path.display()))
}

fn parse_settings(settings: &[String]) -> Result<ResolvedSettings> {
    let mut resolved = ResolvedSettings::new();
    for setting in settings {
        resolved
            .parse_assignment(setting)
            .with_context(|| format!("Invalid setting: {}", setting))?;
    }
    Ok(resolved)
}

/// Workspace from the flag, or `./larder-work/<name>-<version>`
fn workspace_for(args: &WorkspaceArgs, recipe: &Recipe) -> Workspace {
    let root = match &args.workspace {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from("larder-work")
            .join(format!("{}-{}", recipe.package.name, recipe.package.version)),
    };
    Workspace::new(root)
}
