// src/filesystem/mod.rs

//! Filesystem helpers shared by the lifecycle hooks

pub mod path;

pub use path::{join_under, sanitize_path};
