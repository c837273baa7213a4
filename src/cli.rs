// src/cli.rs
//! CLI definitions for larder
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "larder")]
#[command(version)]
#[command(about = "Build C/C++ libraries from recipes into portable package layouts", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Recipe file plus template variables
#[derive(Args, Debug, Clone)]
pub struct RecipeArgs {
    /// Path to the recipe file
    pub recipe: String,

    /// Template variable (KEY=VALUE), fills `@KEY@` in the recipe
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE")]
    pub defines: Vec<String>,
}

/// Where a build's source, build and package folders live
#[derive(Args, Debug, Clone)]
pub struct WorkspaceArgs {
    /// Workspace directory (default: ./larder-work/<name>-<version>)
    #[arg(short, long)]
    pub workspace: Option<String>,
}

/// Build configuration
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Settings axis value (AXIS=VALUE), e.g. build_type=Release
    #[arg(short = 's', long = "setting", value_name = "AXIS=VALUE")]
    pub settings: Vec<String>,

    /// Number of parallel build jobs (default: available CPUs)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub jobs: Option<u32>,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetcherArg {
    /// git clone --recurse-submodules
    #[default]
    Git,
    /// Copy a local source tree
    Copy,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse, resolve and validate a recipe
    Validate {
        #[command(flatten)]
        recipe: RecipeArgs,
    },

    /// Show a recipe's package metadata
    Info {
        #[command(flatten)]
        recipe: RecipeArgs,
    },

    /// Acquire the source tree only
    Source {
        #[command(flatten)]
        recipe: RecipeArgs,

        #[command(flatten)]
        workspace: WorkspaceArgs,

        /// How to retrieve the source
        #[arg(long, value_enum, default_value_t = FetcherArg::Git)]
        fetcher: FetcherArg,
    },

    /// Configure and build an acquired source tree
    Build {
        #[command(flatten)]
        recipe: RecipeArgs,

        #[command(flatten)]
        workspace: WorkspaceArgs,

        #[command(flatten)]
        build: BuildArgs,
    },

    /// Collect build artifacts into the package layout
    Package {
        #[command(flatten)]
        recipe: RecipeArgs,

        #[command(flatten)]
        workspace: WorkspaceArgs,
    },

    /// Acquire, build and package in one go
    Cook {
        #[command(flatten)]
        recipe: RecipeArgs,

        #[command(flatten)]
        workspace: WorkspaceArgs,

        #[command(flatten)]
        build: BuildArgs,

        /// How to retrieve the source
        #[arg(long, value_enum, default_value_t = FetcherArg::Git)]
        fetcher: FetcherArg,

        /// Skip comparing declared metadata with the staged layout
        #[arg(long)]
        no_check: bool,
    },

    /// Print consumption metadata for a packaged layout
    Publish {
        #[command(flatten)]
        recipe: RecipeArgs,

        #[command(flatten)]
        workspace: WorkspaceArgs,

        /// Emit JSON instead of compiler flags
        #[arg(long)]
        json: bool,
    },
}
