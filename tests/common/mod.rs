// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Recipe template modelled on a small header-plus-library C++ project.
///
/// Placeholders: `@NAME@`, `@VERSION@`, `@SOURCE_DIR@`.
pub const RECIPE_TEMPLATE: &str = r#"
[package]
name = "@NAME@"
version = "@VERSION@"
license = "MIT"
author = "Larder Tests (tests@example.com)"
homepage = "https://example.com/mylib"
description = "A small library used by the larder test-suite."
topics = ["test", "c++"]
settings = ["os", "compiler", "build_type", "arch"]

[source]
git = "https://example.com/mylib.git"
local = "@SOURCE_DIR@"

[build]
tool = "command"
source_folder = "@NAME@"
configure = "echo \"$LARDER_SETTING_BUILD_TYPE\" > configured.txt"
build = "mkdir -p src && cp \"$LARDER_SOURCE_DIR/src/mylib.cpp\" src/libmylib.so && cp \"$LARDER_SOURCE_DIR/src/mylib.cpp\" src/libmylib.a"

[[artifacts]]
pattern = "*.hpp"
dst = "include"
src = "@NAME@/include"
from = "source"

[[artifacts]]
pattern = "*.h"
dst = "include"
src = "@NAME@/include"
from = "source"

[[artifacts]]
pattern = "*mylib.lib"
dst = "lib"
keep_path = false

[[artifacts]]
pattern = "*.dll"
dst = "bin"
keep_path = false

[[artifacts]]
pattern = "*.so"
dst = "lib"
keep_path = false

[[artifacts]]
pattern = "*.dylib"
dst = "lib"
keep_path = false

[[artifacts]]
pattern = "*.a"
dst = "lib"
keep_path = false

[info]
libs = ["mylib"]
include_dirs = ["include/mylib"]
"#;

/// Create a source tree with public headers and a fake translation unit.
///
/// Returns the TempDir holding it; keep it alive for the test.
pub fn create_source_tree() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(&root.join("CMakeLists.txt"), "project(mylib CXX)\n");
    write(&root.join("include/mylib/mylib.hpp"), "#pragma once\nint answer();\n");
    write(&root.join("include/mylib/detail/config.h"), "#define MYLIB 1\n");
    write(&root.join("src/mylib.cpp"), "int answer() { return 42; }\n");

    dir
}

/// Write the recipe template into `dir` and return its path.
pub fn write_recipe(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("recipe.toml");
    write(&path, RECIPE_TEMPLATE);
    path
}

/// Template variables for a build from `source_dir`.
pub fn vars(source_dir: &Path) -> std::collections::BTreeMap<String, String> {
    [
        ("NAME", "mylib".to_string()),
        ("VERSION", "1.0.0".to_string()),
        ("SOURCE_DIR", source_dir.to_string_lossy().to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

pub fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}
