//! Workspace configuration
//!
//! The library package name is read once from the library manifest when the
//! tool starts and stays immutable for the rest of the run; every flow
//! receives it through [`Config`] instead of reaching for global state.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::manifest::Manifest;

/// Peer dependencies synced from the workspace root manifest into the
/// library manifest when `sync` is invoked without explicit `--dep` flags.
pub const DEFAULT_PEER_DEPS: &[&str] = &["@angular/material", "@angular/cdk"];

/// Relative path of the library manifest inside the workspace.
const LIBRARY_MANIFEST: &str = "src/package.json";

/// Directory the library build drops its packaged tarball into.
const DIST_DIR: &str = "dist";

#[derive(Debug, Clone)]
pub struct Config {
    /// Published name of the library package (e.g. `@acme/ui-theme`).
    pub package_name: String,
    /// Root of the library workspace.
    pub workspace_root: PathBuf,
}

impl Config {
    /// Read the configuration from the workspace, once, at program start.
    pub fn load(workspace_root: &Path) -> anyhow::Result<Self> {
        let manifest_path = workspace_root.join(LIBRARY_MANIFEST);
        let manifest = Manifest::load(&manifest_path).with_context(|| {
            format!(
                "failed to load library manifest {}",
                manifest_path.display()
            )
        })?;

        let package_name = manifest
            .name()
            .with_context(|| format!("{} has no \"name\" field", manifest_path.display()))?
            .to_string();

        Ok(Self {
            package_name,
            workspace_root: workspace_root.to_path_buf(),
        })
    }

    /// Path of the workspace root manifest.
    pub fn root_manifest_path(&self) -> PathBuf {
        self.workspace_root.join("package.json")
    }

    /// Path of the library manifest.
    pub fn library_manifest_path(&self) -> PathBuf {
        self.workspace_root.join(LIBRARY_MANIFEST)
    }

    /// Directory the packaged tarball is built into.
    pub fn dist_dir(&self) -> PathBuf {
        self.workspace_root.join(DIST_DIR)
    }
}
