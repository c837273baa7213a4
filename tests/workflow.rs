// tests/workflow.rs

//! Real git + cmake workflow.

mod common;

use larder::recipe::{Kitchen, KitchenConfig, ResolvedSettings, Workspace, parse_recipe};
use std::process::Command;

#[test]
#[ignore] // Ignored by default since it requires git and cmake with a C++ compiler
fn test_cmake_workflow() {
    // To run: cargo test test_cmake_workflow -- --ignored
    if which::which("git").is_err() || which::which("cmake").is_err() {
        eprintln!("Skipping cmake workflow test: git or cmake not in PATH");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let repo = dir.path().join("mylib-repo");
    common::write(
        &repo.join("CMakeLists.txt"),
        "cmake_minimum_required(VERSION 3.10)\n\
         project(mylib CXX)\n\
         add_library(mylib STATIC src/mylib.cpp)\n\
         target_include_directories(mylib PUBLIC include)\n",
    );
    common::write(&repo.join("include/mylib/mylib.hpp"), "#pragma once\nint answer();\n");
    common::write(&repo.join("src/mylib.cpp"), "int answer() { return 42; }\n");

    for args in [
        vec!["init", "-q"],
        vec!["add", "."],
        vec![
            "-c",
            "user.name=larder",
            "-c",
            "user.email=larder@example.com",
            "commit",
            "-q",
            "-m",
            "initial",
        ],
    ] {
        let status = Command::new("git")
            .args(&args)
            .current_dir(&repo)
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed", args);
    }

    let recipe = parse_recipe(&format!(
        r#"
[package]
name = "mylib"
version = "1.0.0"
settings = ["build_type"]

[source]
git = "{}"

[build]
source_folder = "mylib"
defines = {{ CMAKE_POSITION_INDEPENDENT_CODE = "ON" }}

[[artifacts]]
pattern = "*.hpp"
dst = "include"
src = "mylib/include"
from = "source"

[[artifacts]]
pattern = "*.a"
dst = "lib"
keep_path = false

[[artifacts]]
pattern = "*.lib"
dst = "lib"
keep_path = false

[info]
libs = ["mylib"]
include_dirs = ["include/mylib"]
"#,
        repo.display()
    ))
    .unwrap();

    let workspace = Workspace::new(dir.path().join("work"));
    let kitchen = Kitchen::new(KitchenConfig::default());
    let settings = ResolvedSettings::new().with("build_type", "Release");

    let result = kitchen.cook(&recipe, &settings, &workspace).unwrap();

    assert!(result.layout.contains("include/mylib/mylib.hpp"));
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
}
