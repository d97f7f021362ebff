use std::fs;
use std::path::Path;
use std::sync::Mutex;

use devlink::config::Config;
use devlink::npm::{CommandError, PackageManager};
use tempfile::TempDir;

/// A recording fake for the package manager: answers version lookups from a
/// fixed list and records every install command it receives.
#[allow(dead_code)]
pub struct FakeNpm {
    versions: Vec<String>,
    pub calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeNpm {
    pub fn with_versions(versions: &[&str]) -> Self {
        Self {
            versions: versions.iter().map(|s| s.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl PackageManager for FakeNpm {
    fn view_versions(&self, package: &str) -> Result<Vec<String>, CommandError> {
        self.record(format!("view {package}"));
        Ok(self.versions.clone())
    }

    fn install(&self, spec: &str) -> Result<(), CommandError> {
        self.record(format!("install {spec}"));
        Ok(())
    }

    fn install_all(&self) -> Result<(), CommandError> {
        self.record("install".to_string());
        Ok(())
    }

    fn cache_clean(&self) -> Result<(), CommandError> {
        self.record("cache clean".to_string());
        Ok(())
    }
}

/// Create a library workspace with a `src/package.json` and return its config.
pub fn library_workspace(package_name: &str) -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(
        dir.path().join("src/package.json"),
        format!(r#"{{"name": "{package_name}", "version": "2.0.0"}}"#),
    )
    .unwrap();
    let config = Config::load(dir.path()).unwrap();
    (dir, config)
}

/// Create a target project declaring the package as a regular dependency.
#[allow(dead_code)]
pub fn target_project(package_name: &str, version: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("package.json"),
        format!(
            r#"{{
  "name": "portal-shell",
  "version": "1.0.0",
  "dependencies": {{
    "{package_name}": "{version}"
  }}
}}"#
        ),
    )
    .unwrap();
    dir
}

/// Populate `node_modules` and a lock file as a previous install would have.
#[allow(dead_code)]
pub fn seed_installed_state(target: &Path, package_name: &str) {
    let mut module_dir = target.join("node_modules");
    for segment in package_name.split('/') {
        module_dir.push(segment);
    }
    fs::create_dir_all(&module_dir).unwrap();
    fs::write(module_dir.join("package.json"), "{}").unwrap();
    fs::write(target.join("package-lock.json"), "{}").unwrap();
}
