//! `package.json` reading and editing
//!
//! Manifests are kept as order-preserving JSON documents so that a rewritten
//! file keeps the author's key order and any fields this tool does not know
//! about. Dependency lookups cover the `dependencies`, `devDependencies` and
//! `peerDependencies` sections.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::version::is_local_reference;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("no package.json found at {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} does not contain a JSON object")]
    NotAnObject(PathBuf),
}

/// The manifest section a dependency lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Dependencies,
    DevDependencies,
    PeerDependencies,
}

impl DependencyKind {
    /// All sections, in manifest declaration order.
    pub const ALL: [DependencyKind; 3] = [
        DependencyKind::Dependencies,
        DependencyKind::DevDependencies,
        DependencyKind::PeerDependencies,
    ];

    /// The JSON key of this section.
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyKind::Dependencies => "dependencies",
            DependencyKind::DevDependencies => "devDependencies",
            DependencyKind::PeerDependencies => "peerDependencies",
        }
    }
}

/// An npm `package.json` document.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    doc: Value,
}

impl Manifest {
    /// Load the manifest from a `package.json` file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let doc: Value =
            serde_json::from_str(&content).map_err(|source| ManifestError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        if !doc.is_object() {
            return Err(ManifestError::NotAnObject(path.to_path_buf()));
        }

        Ok(Self { doc })
    }

    /// Write the manifest back as 2-space pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let content = serde_json::to_string_pretty(&self.doc).map_err(|source| {
            ManifestError::Malformed {
                path: path.to_path_buf(),
                source,
            }
        })?;

        fs::write(path, content + "\n").map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The `name` field, if present.
    pub fn name(&self) -> Option<&str> {
        self.doc.get("name").and_then(Value::as_str)
    }

    fn section(&self, kind: DependencyKind) -> Option<&serde_json::Map<String, Value>> {
        self.doc.get(kind.as_str()).and_then(Value::as_object)
    }

    /// All dependencies across the three sections, merged.
    ///
    /// Later sections overwrite earlier ones, so a package listed both as a
    /// regular and a peer dependency reports the peer version.
    pub fn all_dependencies(&self) -> IndexMap<String, String> {
        let mut merged = IndexMap::new();
        for kind in DependencyKind::ALL {
            if let Some(section) = self.section(kind) {
                for (name, version) in section {
                    if let Some(version) = version.as_str() {
                        merged.insert(name.clone(), version.to_string());
                    }
                }
            }
        }
        merged
    }

    /// Whether the package appears in any dependency section.
    pub fn has_dependency(&self, name: &str) -> bool {
        self.all_dependencies().contains_key(name)
    }

    /// The version string for the package, peer section winning over dev and regular.
    pub fn dependency_version(&self, name: &str) -> Option<String> {
        self.all_dependencies().get(name).cloned()
    }

    /// The version string for the package in `devDependencies` only.
    pub fn dev_dependency_version(&self, name: &str) -> Option<String> {
        self.section(DependencyKind::DevDependencies)?
            .get(name)?
            .as_str()
            .map(|s| s.to_string())
    }

    /// Find the first section declaring the package, with its version string.
    pub fn find_dependency(&self, name: &str) -> Option<(DependencyKind, String)> {
        for kind in DependencyKind::ALL {
            if let Some(version) = self
                .section(kind)
                .and_then(|section| section.get(name))
                .and_then(Value::as_str)
            {
                return Some((kind, version.to_string()));
            }
        }
        None
    }

    /// Remove the package from the first section declaring it.
    ///
    /// Returns the section and version it was removed from, or `None` if the
    /// package was not declared.
    pub fn remove_dependency(&mut self, name: &str) -> Option<(DependencyKind, String)> {
        let (kind, version) = self.find_dependency(name)?;
        if let Some(section) = self
            .doc
            .get_mut(kind.as_str())
            .and_then(Value::as_object_mut)
        {
            // shift_remove keeps the order of the remaining entries
            section.shift_remove(name);
        }
        Some((kind, version))
    }

    /// Insert or overwrite a peer dependency entry.
    pub fn set_peer_dependency(&mut self, name: &str, version: &str) {
        // The root is validated as an object when the manifest is loaded
        let doc = self
            .doc
            .as_object_mut()
            .expect("manifest root is an object");
        let section = doc
            .entry(DependencyKind::PeerDependencies.as_str())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        if let Some(section) = section.as_object_mut() {
            section.insert(name.to_string(), Value::String(version.to_string()));
        }
    }
}

/// How a package ended up in a project's `node_modules`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallSource {
    /// Installed from a local file path.
    LocalFile,
    /// Installed from the registry.
    Registry,
    /// Not present in `node_modules`.
    NotInstalled,
}

/// The parts of an installed package's `package.json` we inspect.
#[derive(Debug, Deserialize)]
struct InstalledPackage {
    #[serde(rename = "_resolved")]
    resolved: Option<String>,
}

/// The parts of `package-lock.json` we inspect.
#[derive(Debug, Default, Deserialize)]
struct LockFile {
    #[serde(default)]
    dependencies: IndexMap<String, LockEntry>,
}

#[derive(Debug, Deserialize)]
struct LockEntry {
    resolved: Option<String>,
}

/// Classify how the package was installed by inspecting `node_modules` and
/// the lock file.
///
/// The installed package's `_resolved` field is checked first, then the lock
/// file's `resolved` field. Unreadable metadata is treated as a local
/// installation so that a restore still runs.
pub fn detect_install_source(target: &Path, package_name: &str) -> InstallSource {
    let mut installed_dir = target.join("node_modules");
    for segment in package_name.split('/') {
        installed_dir.push(segment);
    }

    if !installed_dir.exists() {
        return InstallSource::NotInstalled;
    }

    let installed_manifest = installed_dir.join("package.json");
    if !installed_manifest.exists() {
        return InstallSource::Registry;
    }

    let Ok(content) = fs::read_to_string(&installed_manifest) else {
        warn!(path = %installed_manifest.display(), "could not read installed package metadata, assuming local installation");
        return InstallSource::LocalFile;
    };

    match serde_json::from_str::<InstalledPackage>(&content) {
        Ok(installed) => {
            if installed.resolved.as_deref().is_some_and(is_local_reference) {
                return InstallSource::LocalFile;
            }
        }
        Err(err) => {
            warn!(path = %installed_manifest.display(), error = %err, "could not parse installed package metadata, assuming local installation");
            return InstallSource::LocalFile;
        }
    }

    let lock_path = target.join("package-lock.json");
    if lock_path.exists()
        && let Ok(content) = fs::read_to_string(&lock_path)
        && let Ok(lock) = serde_json::from_str::<LockFile>(&content)
        && let Some(entry) = lock.dependencies.get(package_name)
        && entry.resolved.as_deref().is_some_and(is_local_reference)
    {
        return InstallSource::LocalFile;
    }

    InstallSource::Registry
}
