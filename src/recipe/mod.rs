// src/recipe/mod.rs

//! Recipe system for packaging libraries from source
//!
//! A recipe declares:
//! - Package metadata and the settings axes a build depends on
//! - Where the source tree lives (git URL, optionally overridden by a
//!   local working tree)
//! - Which external build system to drive
//! - Ordered artifact rules mapping build outputs into `include/`, `lib/`
//!   and `bin/`
//! - What a consumer links against
//!
//! # Culinary Terminology
//!
//! Recipes are described with cooking metaphors:
//! - **Recipe**: The build specification (like a recipe card)
//! - **Kitchen**: Runs the lifecycle hooks against a workspace
//! - **Cook**: Source, build and package in one go
//! - **Prep**: Acquire the source tree
//! - **Simmer**: Configure and build
//! - **Plate**: Collect artifacts into the package layout
//!
//! # Example Recipe
//!
//! ```toml
//! [package]
//! name = "@NAME@"
//! version = "@VERSION@"
//! license = "MIT"
//! settings = ["os", "compiler", "build_type", "arch"]
//!
//! [source]
//! git = "https://gitlab.com/headcode.space/url.git"
//! local = "@SOURCE_DIR@"
//!
//! [build]
//! source_folder = "@NAME@"
//!
//! [[artifacts]]
//! pattern = "*.hpp"
//! dst = "include"
//! src = "@NAME@/include"
//! from = "source"
//!
//! [[artifacts]]
//! pattern = "*.so"
//! dst = "lib"
//! keep_path = false
//!
//! [info]
//! libs = ["hcs-url"]
//! include_dirs = ["include/headcode/url"]
//! ```

mod format;
mod kitchen;
mod metadata;
pub mod parser;

pub use format::{
    ArtifactRoot, ArtifactRule, BuildSection, BuildToolKind, PackageInfo, PackageSection, Recipe,
    SourceLocation, SourceSection,
};
pub use kitchen::{
    BuildOutput, BuildOutputTree, BuildRequest, BuildTool, CMakeTool, CommandTool,
    ConsumptionMetadata, CookResult, CopyFetcher, FetcherKind, GitFetcher, Kitchen, KitchenConfig,
    LayoutManifest, PackageLayout, ResolvedSettings, SourceFetcher, SourceTree, Workspace,
    acquire_source, check_layout, collect, invoke_build, publish, setting_env_name,
    unresolved_submodules,
};
pub use metadata::{MetadataRecord, RecipeTemplate};
pub use parser::{load_recipe, parse_recipe, parse_recipe_file, validate_recipe};
