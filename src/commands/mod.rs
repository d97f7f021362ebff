//! Command flows
//!
//! One linear flow per subcommand, each a sequence of manifest reads,
//! package-manager invocations and file writes.
//!
//! # Modules
//!
//! - [`deploy`]: Install the locally built tarball into a sibling project
//! - [`restore`]: Replace a local installation with a registry-published version
//! - [`sync`]: Copy pinned dependency versions into the library manifest

pub mod deploy;
pub mod restore;
pub mod sync;

use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use crate::manifest::Manifest;
use crate::npm::PackageManager;

/// Load and validate the target project's manifest.
pub(crate) fn load_target_manifest(target: &Path) -> anyhow::Result<Manifest> {
    let manifest = Manifest::load(&target.join("package.json"))
        .with_context(|| format!("{} is not an npm project", target.display()))?;

    match manifest.name() {
        Some(name) => info!("valid npm project found: {name}"),
        None => info!("valid npm project found: {}", target.display()),
    }

    Ok(manifest)
}

/// Best-effort cache clearing in the target project.
///
/// Cleans the npm cache and removes `node_modules/` and `package-lock.json`.
/// Every step is allowed to fail with a warning so a restore or deploy can
/// still proceed.
pub(crate) fn clear_caches(target: &Path, npm: &dyn PackageManager) {
    info!("clearing caches");

    if let Err(err) = npm.cache_clean() {
        warn!("npm cache could not be cleaned, continuing: {err}");
    }

    let node_modules = target.join("node_modules");
    if node_modules.exists() {
        info!("deleting node_modules directory");
        if let Err(err) = fs::remove_dir_all(&node_modules) {
            warn!("node_modules could not be deleted: {err}");
        }
    }

    let package_lock = target.join("package-lock.json");
    if package_lock.exists() {
        info!("deleting package-lock.json");
        if let Err(err) = fs::remove_file(&package_lock) {
            warn!("package-lock.json could not be deleted: {err}");
        }
    }
}
