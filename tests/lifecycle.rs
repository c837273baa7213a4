// tests/lifecycle.rs

//! End-to-end recipe lifecycle: resolve, source, build, package, publish.

mod common;

use common::{create_source_tree, vars, write_recipe};
use larder::recipe::{
    Kitchen, KitchenConfig, PackageLayout, ResolvedSettings, Workspace, check_layout, load_recipe,
    validate_recipe,
};
use larder::Error;

fn settings() -> ResolvedSettings {
    ResolvedSettings::new()
        .with("os", "Linux")
        .with("compiler", "gcc")
        .with("build_type", "Release")
        .with("arch", "x86_64")
}

#[test]
fn test_template_resolves_and_validates() {
    let source = create_source_tree();
    let dir = tempfile::tempdir().unwrap();
    let recipe_path = write_recipe(dir.path());

    let recipe = load_recipe(&recipe_path, &vars(source.path())).unwrap();
    let metadata = recipe.metadata().unwrap();

    assert_eq!(metadata.reference(), "mylib/1.0.0");
    assert_eq!(metadata.settings(), ["os", "compiler", "build_type", "arch"]);
    assert_eq!(recipe.build.source_folder, "mylib");
    assert_eq!(recipe.artifacts.len(), 7);
    assert!(validate_recipe(&recipe).unwrap().is_empty());
}

#[cfg(unix)]
#[test]
fn test_cook_then_publish() {
    let source = create_source_tree();
    let dir = tempfile::tempdir().unwrap();
    let recipe = load_recipe(&write_recipe(dir.path()), &vars(source.path())).unwrap();
    let workspace = Workspace::new(dir.path().join("work"));
    let kitchen = Kitchen::new(KitchenConfig::with_copy_fetcher());

    let result = kitchen.cook(&recipe, &settings(), &workspace).unwrap();

    let files: Vec<String> = result
        .layout
        .files()
        .map(|f| f.to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(
        files,
        vec![
            "include/mylib/detail/config.h",
            "include/mylib/mylib.hpp",
            "lib/libmylib.a",
            "lib/libmylib.so",
        ]
    );
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    assert!(result.log.contains("=== configure ==="));
    assert_eq!(
        std::fs::read_to_string(result.output.root().join("configured.txt"))
            .unwrap()
            .trim(),
        "Release"
    );

    // Publication happens later, from the durable layout alone
    let layout = PackageLayout::scan(workspace.package_dir()).unwrap();
    let published = kitchen.publish(&recipe, &layout).unwrap();
    assert_eq!(published.package, "mylib/1.0.0");
    assert_eq!(published.libs, vec!["mylib"]);
    assert!(published.include_dirs[0].ends_with("include/mylib"));
    assert!(published.include_dirs[0].is_absolute());
    assert!(check_layout(&published, &layout).is_empty());
}

#[cfg(unix)]
#[test]
fn test_hooks_run_separately() {
    let source = create_source_tree();
    let dir = tempfile::tempdir().unwrap();
    let recipe = load_recipe(&write_recipe(dir.path()), &vars(source.path())).unwrap();
    let workspace = Workspace::new(dir.path().join("work"));
    let kitchen = Kitchen::new(KitchenConfig::with_copy_fetcher());

    let tree = kitchen.source(&recipe, &workspace).unwrap();
    assert!(tree.root().join("src/mylib.cpp").is_file());

    let output = kitchen.build(&recipe, &settings(), &tree, &workspace).unwrap();
    assert!(output.tree.root().join("src/libmylib.so").is_file());

    let first = kitchen.package(&recipe, &tree, &output.tree, &workspace).unwrap();
    let second = kitchen.package(&recipe, &tree, &output.tree, &workspace).unwrap();
    assert_eq!(first.manifest().unwrap(), second.manifest().unwrap());
}

#[test]
fn test_missing_local_override_is_source_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("not-there");
    let recipe = load_recipe(&write_recipe(dir.path()), &vars(&missing)).unwrap();
    let workspace = Workspace::new(dir.path().join("work"));
    let kitchen = Kitchen::new(KitchenConfig::with_copy_fetcher());

    let err = kitchen.cook(&recipe, &settings(), &workspace).unwrap_err();
    assert!(matches!(err, Error::SourceRetrieval(_)), "{err}");
    assert!(!workspace.source_dir().join("mylib").exists());
}

#[test]
fn test_missing_source_folder_is_configuration_error() {
    let source = create_source_tree();
    let dir = tempfile::tempdir().unwrap();
    let mut recipe = load_recipe(&write_recipe(dir.path()), &vars(source.path())).unwrap();
    recipe.build.source_folder = "mylib/cmake".to_string();
    let workspace = Workspace::new(dir.path().join("work"));
    let kitchen = Kitchen::new(KitchenConfig::with_copy_fetcher());

    let err = kitchen.cook(&recipe, &settings(), &workspace).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)), "{err}");
    assert!(!workspace.build_dir().exists());
    assert!(!workspace.package_dir().exists());
}

#[cfg(unix)]
#[test]
fn test_failing_build_stops_before_packaging() {
    let source = create_source_tree();
    let dir = tempfile::tempdir().unwrap();
    let mut recipe = load_recipe(&write_recipe(dir.path()), &vars(source.path())).unwrap();
    recipe.build.build = Some("echo 'mylib.cpp:1: error: oops' >&2; exit 2".to_string());
    let workspace = Workspace::new(dir.path().join("work"));
    let kitchen = Kitchen::new(KitchenConfig::with_copy_fetcher());

    let err = kitchen.cook(&recipe, &settings(), &workspace).unwrap_err();
    assert!(matches!(err, Error::Build(_)));
    assert!(err.to_string().contains("mylib.cpp:1: error: oops"));
    assert!(!workspace.package_dir().exists());
}

#[test]
fn test_second_cook_needs_cleanup() {
    let source = create_source_tree();
    let dir = tempfile::tempdir().unwrap();
    let recipe = load_recipe(&write_recipe(dir.path()), &vars(source.path())).unwrap();
    let workspace = Workspace::new(dir.path().join("work"));
    let kitchen = Kitchen::new(KitchenConfig::with_copy_fetcher());

    kitchen.source(&recipe, &workspace).unwrap();
    let err = kitchen.source(&recipe, &workspace).unwrap_err();
    assert!(matches!(err, Error::SourceRetrieval(_)));

    std::fs::remove_dir_all(workspace.source_dir()).unwrap();
    assert!(kitchen.source(&recipe, &workspace).is_ok());
}

#[test]
fn test_source_dir_cannot_leave_workspace() {
    let source = create_source_tree();
    let dir = tempfile::tempdir().unwrap();
    let mut recipe = load_recipe(&write_recipe(dir.path()), &vars(source.path())).unwrap();
    recipe.source.dir = Some("../../escaped".to_string());
    let workspace = Workspace::new(dir.path().join("work"));
    let kitchen = Kitchen::new(KitchenConfig::with_copy_fetcher());

    let err = kitchen.source(&recipe, &workspace).unwrap_err();
    assert!(matches!(err, Error::SourceRetrieval(_)), "{err}");
    assert!(!dir.path().join("escaped").exists());
    assert!(!workspace.source_dir().exists());
}
