//! Sync pinned dependency versions into the library manifest

use anyhow::Context;
use tracing::{info, warn};

use crate::config::{Config, DEFAULT_PEER_DEPS};
use crate::manifest::Manifest;

/// Copy pinned dependency versions from the workspace root manifest into the
/// library manifest's `peerDependencies`.
///
/// Dependencies absent from the root `devDependencies` are skipped with a
/// warning. An empty `deps` list falls back to [`DEFAULT_PEER_DEPS`].
pub fn run(config: &Config, deps: &[String]) -> anyhow::Result<()> {
    info!("syncing dependencies for {}", config.package_name);

    let root_path = config.root_manifest_path();
    let library_path = config.library_manifest_path();

    let root = Manifest::load(&root_path)
        .with_context(|| format!("failed to load root manifest {}", root_path.display()))?;
    let mut library = Manifest::load(&library_path)
        .with_context(|| format!("failed to load library manifest {}", library_path.display()))?;

    let deps: Vec<&str> = if deps.is_empty() {
        DEFAULT_PEER_DEPS.to_vec()
    } else {
        deps.iter().map(String::as_str).collect()
    };

    info!("peer dependencies to sync: {}", deps.join(", "));

    let mut synced = 0usize;
    for dep in deps {
        match root.dev_dependency_version(dep) {
            Some(version) => {
                library.set_peer_dependency(dep, &version);
                info!("synced {dep}: {version}");
                synced += 1;
            }
            None => warn!("{dep} not found in root devDependencies"),
        }
    }

    library
        .save(&library_path)
        .context("failed to rewrite library manifest")?;

    info!("dependencies are in sync");
    info!("  root package:    {}", root.name().unwrap_or("?"));
    info!("  library package: {}", library.name().unwrap_or("?"));
    info!("  synced peer dependencies: {synced}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn workspace(root_manifest: &str, library_manifest: &str) -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), root_manifest).unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/package.json"), library_manifest).unwrap();
        let config = Config::load(dir.path()).unwrap();
        (dir, config)
    }

    #[test]
    fn sync_copies_pinned_versions_into_peer_dependencies() {
        let (dir, config) = workspace(
            r#"{
  "name": "ui-theme-workspace",
  "devDependencies": {
    "@angular/material": "~17.3.1",
    "@angular/cdk": "~17.3.1",
    "typescript": "5.4.2"
  }
}"#,
            r#"{
  "name": "@acme/ui-theme",
  "version": "2.0.0",
  "peerDependencies": {
    "@angular/material": "~17.2.0"
  }
}"#,
        );

        run(&config, &[]).unwrap();

        let library = Manifest::load(&config.library_manifest_path()).unwrap();
        assert_eq!(
            library.dependency_version("@angular/material"),
            Some("~17.3.1".to_string())
        );
        assert_eq!(
            library.dependency_version("@angular/cdk"),
            Some("~17.3.1".to_string())
        );
        drop(dir);
    }

    #[test]
    fn sync_skips_dependencies_missing_from_root() {
        let (_dir, config) = workspace(
            r#"{"name": "ui-theme-workspace", "devDependencies": {"@angular/cdk": "~17.3.1"}}"#,
            r#"{"name": "@acme/ui-theme", "version": "2.0.0"}"#,
        );

        run(&config, &[]).unwrap();

        let library = Manifest::load(&config.library_manifest_path()).unwrap();
        assert_eq!(
            library.dependency_version("@angular/cdk"),
            Some("~17.3.1".to_string())
        );
        assert_eq!(library.dependency_version("@angular/material"), None);
    }

    #[test]
    fn sync_honors_explicit_dependency_list() {
        let (_dir, config) = workspace(
            r#"{"name": "ws", "devDependencies": {"rxjs": "7.8.1", "@angular/cdk": "~17.3.1"}}"#,
            r#"{"name": "@acme/ui-theme", "version": "2.0.0"}"#,
        );

        run(&config, &["rxjs".to_string()]).unwrap();

        let library = Manifest::load(&config.library_manifest_path()).unwrap();
        assert_eq!(library.dependency_version("rxjs"), Some("7.8.1".to_string()));
        // Not in the explicit list, not synced
        assert_eq!(library.dependency_version("@angular/cdk"), None);
    }
}
