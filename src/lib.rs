// src/lib.rs

//! Larder: a package-recipe executor
//!
//! Takes a declarative recipe for a C/C++ library, fetches its source,
//! drives its build system, stages the build outputs into a portable
//! `include/` `lib/` `bin/` layout, and tells consumers what to link.
//!
//! # Architecture
//!
//! - Recipes are TOML templates resolved once into an immutable record
//! - Lifecycle hooks run strictly in order and fail fast
//! - Artifact selection is an ordered, declarative rule table
//! - Consumption metadata is declared, never discovered by scanning

mod error;
pub mod filesystem;
pub mod hash;
pub mod recipe;

pub use error::{Error, Result};
pub use recipe::{
    ConsumptionMetadata, CookResult, Kitchen, KitchenConfig, MetadataRecord, PackageLayout,
    Recipe, ResolvedSettings, Workspace,
};
