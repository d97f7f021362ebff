mod helper;

use devlink::commands::restore;
use devlink::manifest::Manifest;
use helper::{FakeNpm, library_workspace, seed_installed_state, target_project};

#[test]
fn restore_replaces_local_installation_end_to_end() {
    let (_ws, config) = library_workspace("@acme/ui-theme");
    let target = target_project("@acme/ui-theme", "file:../ui-theme/dist/acme-ui-theme-2.0.0.tgz");
    seed_installed_state(target.path(), "@acme/ui-theme");

    let npm = FakeNpm::with_versions(&["1.9.0", "2.0.0", "2.1.0-rc1"]);

    restore::run(&config, target.path(), None, &npm).unwrap();

    // Caches cleared on disk
    assert!(!target.path().join("node_modules").exists());
    assert!(!target.path().join("package-lock.json").exists());

    // Local entry removed from the manifest before reinstalling
    let manifest = Manifest::load(&target.path().join("package.json")).unwrap();
    assert!(!manifest.has_dependency("@acme/ui-theme"));

    // Latest stable wins over the pre-release
    assert_eq!(
        npm.calls(),
        vec![
            "view @acme/ui-theme",
            "cache clean",
            "install @acme/ui-theme@2.0.0",
            "install",
        ]
    );
}

#[test]
fn restore_skips_registry_installation_that_is_current() {
    let (_ws, config) = library_workspace("@acme/ui-theme");
    let target = target_project("@acme/ui-theme", "^2.1.0");
    seed_installed_state(target.path(), "@acme/ui-theme");

    let npm = FakeNpm::with_versions(&["2.0.0", "2.1.0"]);

    restore::run(&config, target.path(), None, &npm).unwrap();

    // Nothing restored: files untouched, only the registry lookup happened
    assert!(target.path().join("node_modules").exists());
    assert!(target.path().join("package-lock.json").exists());
    assert_eq!(npm.calls(), vec!["view @acme/ui-theme"]);
}

#[test]
fn restore_installs_explicitly_requested_version() {
    let (_ws, config) = library_workspace("@acme/ui-theme");
    let target = target_project("@acme/ui-theme", "^2.1.0");

    let npm = FakeNpm::with_versions(&["2.0.0", "2.1.0"]);

    restore::run(&config, target.path(), Some("2.0.0"), &npm).unwrap();

    assert!(
        npm.calls()
            .contains(&"install @acme/ui-theme@2.0.0".to_string())
    );
}

#[test]
fn restore_without_stable_release_defers_to_registry_latest() {
    let (_ws, config) = library_workspace("@acme/ui-theme");
    let target = target_project("@acme/ui-theme", "file:../ui-theme");

    let npm = FakeNpm::with_versions(&["2.0.0-rc1", "2.0.0-0"]);

    restore::run(&config, target.path(), None, &npm).unwrap();

    // No stable version: install without a version qualifier
    assert!(npm.calls().contains(&"install @acme/ui-theme".to_string()));
}
