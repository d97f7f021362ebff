//! Restore a sibling project to a registry-published version

use std::path::Path;

use anyhow::{Context, bail};
use tracing::{info, warn};

use crate::commands::{clear_caches, load_target_manifest};
use crate::config::Config;
use crate::manifest::{InstallSource, Manifest, detect_install_source};
use crate::npm::PackageManager;
use crate::version::{
    UpdateReason, is_local_reference, needs_update, select_latest_stable,
};

/// Replace a locally linked installation with a registry-published version.
///
/// Without a requested version the latest stable release is installed, and
/// only when there is something to do: the installed dependency is a local
/// file reference, or the registry has a newer stable release.
pub fn run(
    config: &Config,
    target: &Path,
    requested: Option<&str>,
    npm: &dyn PackageManager,
) -> anyhow::Result<()> {
    let package = &config.package_name;
    info!("restoring {package} in {}", target.display());

    let mut manifest = load_target_manifest(target)?;

    if !manifest.has_dependency(package) {
        bail!("{package} is not a dependency of this project, nothing to restore");
    }

    let installed = manifest.dependency_version(package);
    if let Some(installed) = &installed {
        info!("{package} found as dependency with version: {installed}");
    }

    // A failed registry lookup degrades to an empty list; the local-reference
    // check below still decides then.
    let registry_versions = match npm.view_versions(package) {
        Ok(versions) => versions,
        Err(err) => {
            warn!("could not fetch versions from registry: {err}");
            Vec::new()
        }
    };

    let decision = needs_update(installed.as_deref(), &registry_versions, requested);

    match decision.reason {
        Some(UpdateReason::Local) => info!("local installation detected, proceeding"),
        Some(UpdateReason::Explicit) => {
            info!("specific version requested ({}), proceeding", requested.unwrap_or_default());
        }
        Some(UpdateReason::Newer) => info!(
            "newer stable version available ({}), proceeding",
            decision.latest_available.as_deref().unwrap_or_default()
        ),
        None => {
            // The manifest may still hold a registry-style version while
            // node_modules contains a stale local install.
            match detect_install_source(target, package) {
                InstallSource::LocalFile => {
                    info!("stale local installation detected in node_modules, proceeding");
                }
                InstallSource::Registry | InstallSource::NotInstalled => {
                    info!("package is already up to date, nothing to restore");
                    return Ok(());
                }
            }
        }
    }

    clear_caches(target, npm);

    let qualifier = install_qualifier(requested, &registry_versions);
    reinstall_from_registry(&mut manifest, target, package, qualifier.as_deref(), npm)?;

    info!("registry restoration completed");
    info!("  package:     {package}");
    info!("  restored in: {}", target.display());
    info!("  version:     {}", qualifier.as_deref().unwrap_or("latest"));

    Ok(())
}

/// Remove the manifest entry and reinstall the package from the registry.
fn reinstall_from_registry(
    manifest: &mut Manifest,
    target: &Path,
    package: &str,
    version: Option<&str>,
    npm: &dyn PackageManager,
) -> anyhow::Result<()> {
    info!("reinstalling {package} from registry");

    if let Some((kind, removed)) = manifest.remove_dependency(package) {
        manifest
            .save(&target.join("package.json"))
            .context("failed to rewrite package.json")?;
        info!("removed {package} from {} ({removed})", kind.as_str());
    }

    let spec = match version {
        Some(version) => format!("{package}@{version}"),
        None => package.to_string(),
    };

    npm.install(&spec)
        .with_context(|| format!("failed to install {spec}"))?;
    npm.install_all()
        .context("failed to install remaining dependencies")?;

    Ok(())
}

/// The version qualifier to install.
///
/// A requested version is used verbatim unless it is itself a local file
/// reference. Otherwise the latest stable registry release is picked; when
/// none exists the qualifier stays empty and the registry's own `latest` tag
/// decides.
fn install_qualifier(requested: Option<&str>, registry_versions: &[String]) -> Option<String> {
    if let Some(requested) = requested
        && !is_local_reference(requested)
    {
        return Some(requested.to_string());
    }

    match select_latest_stable(registry_versions) {
        Some(latest) => {
            info!("found latest stable version: {latest}");
            Some(latest)
        }
        None => {
            warn!("no stable versions found, using latest available");
            None
        }
    }
}
