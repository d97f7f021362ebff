//! Deploy the locally built tarball into a sibling project

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::commands::{clear_caches, load_target_manifest};
use crate::config::Config;
use crate::npm::PackageManager;

/// Install the newest packaged build into the target project.
///
/// Always installs the latest tarball, replacing any existing installation.
pub fn run(config: &Config, target: &Path, npm: &dyn PackageManager) -> anyhow::Result<()> {
    info!("deploying {} into {}", config.package_name, target.display());

    info!("searching for packaged build");
    let tarball = find_newest_tarball(&config.dist_dir(), &config.package_name)?;
    info!("tarball found: {}", tarball.display());

    let manifest = load_target_manifest(target)?;

    if manifest.has_dependency(&config.package_name) {
        info!("{} found as dependency", config.package_name);
    } else {
        warn!(
            "{} is not declared as a dependency, installing anyway",
            config.package_name
        );
    }

    clear_caches(target, npm);

    info!("installing local package: {}", tarball.display());
    npm.install(&tarball.to_string_lossy())
        .context("failed to install the local package")?;
    npm.install_all()
        .context("failed to install remaining dependencies")?;

    info!("deployment completed");
    info!("  tarball:      {}", tarball.display());
    info!("  installed in: {}", target.display());
    info!("  package:      {}", config.package_name);

    Ok(())
}

/// The tarball file prefix `npm pack` derives from a package name:
/// the `@` is dropped and the scope separator becomes a dash.
fn tarball_prefix(package_name: &str) -> String {
    let slug = package_name.trim_start_matches('@').replace('/', "-");
    format!("{slug}-")
}

/// Find the packaged tarball in the dist directory.
///
/// When several builds are lying around, the newest modification time wins;
/// the chosen file's timestamp is logged so stale builds are noticeable.
fn find_newest_tarball(dist_dir: &Path, package_name: &str) -> anyhow::Result<PathBuf> {
    if !dist_dir.exists() {
        bail!(
            "dist directory {} not found, run the library build first",
            dist_dir.display()
        );
    }

    let prefix = tarball_prefix(package_name);
    let mut tarballs: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();

    for entry in fs::read_dir(dist_dir)
        .with_context(|| format!("failed to read {}", dist_dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with(&prefix) && name.ends_with(".tgz") {
            let modified = entry.metadata()?.modified()?;
            tarballs.push((entry.path(), modified));
        }
    }

    if tarballs.len() > 1 {
        warn!(
            "multiple tarballs found ({}), using the newest one",
            tarballs.len()
        );
    }

    let Some((path, modified)) = tarballs
        .into_iter()
        .max_by_key(|(_, modified)| *modified)
    else {
        bail!(
            "no {}*.tgz found in {}, run the library build first",
            prefix,
            dist_dir.display()
        );
    };

    let timestamp: DateTime<Utc> = modified.into();
    info!("tarball timestamp: {}", timestamp.to_rfc3339());

    Ok(path)
}
