//! Package-manager invocation
//!
//! All shell-outs go through the [`PackageManager`] trait so the command
//! flows can be exercised in tests without spawning processes. The production
//! implementation drives the `npm` binary in the target project directory.

use std::path::{Path, PathBuf};
use std::process::Command;

#[cfg(test)]
use mockall::automock;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to execute npm: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("`{command}` failed: {stderr}")]
    Failed { command: String, stderr: String },

    #[error("unexpected npm output: {0}")]
    InvalidOutput(String),
}

/// Trait for the external package manager the flows drive
#[cfg_attr(test, automock)]
pub trait PackageManager: Send + Sync {
    /// Fetch all published versions for a package from the registry.
    fn view_versions(&self, package: &str) -> Result<Vec<String>, CommandError>;

    /// Install a single package spec (`name`, `name@version`, or a tarball path).
    fn install(&self, spec: &str) -> Result<(), CommandError>;

    /// Install all dependencies of the project.
    fn install_all(&self) -> Result<(), CommandError>;

    /// Clean the package manager's cache.
    fn cache_clean(&self) -> Result<(), CommandError>;
}

/// Production runner invoking the `npm` binary.
pub struct NpmCli {
    cwd: PathBuf,
}

impl NpmCli {
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
        }
    }

    fn npm(&self, args: &[&str]) -> Result<String, CommandError> {
        debug!(cwd = %self.cwd.display(), "npm {}", args.join(" "));

        let output = Command::new("npm")
            .args(args)
            .current_dir(&self.cwd)
            .output()?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                command: format!("npm {}", args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl PackageManager for NpmCli {
    fn view_versions(&self, package: &str) -> Result<Vec<String>, CommandError> {
        let output = self.npm(&["view", package, "versions", "--json"])?;
        parse_versions_output(&output)
    }

    fn install(&self, spec: &str) -> Result<(), CommandError> {
        self.npm(&["install", spec]).map(|_| ())
    }

    fn install_all(&self) -> Result<(), CommandError> {
        self.npm(&["install"]).map(|_| ())
    }

    fn cache_clean(&self) -> Result<(), CommandError> {
        self.npm(&["cache", "clean", "--force"]).map(|_| ())
    }
}

/// Parse the JSON printed by `npm view <pkg> versions --json`.
///
/// A package with several releases answers with an array; one with a single
/// release answers with a bare string.
fn parse_versions_output(output: &str) -> Result<Vec<String>, CommandError> {
    let value: Value = serde_json::from_str(output.trim())
        .map_err(|e| CommandError::InvalidOutput(e.to_string()))?;

    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect()),
        Value::String(version) => Ok(vec![version]),
        other => Err(CommandError::InvalidOutput(format!(
            "expected a version list, got: {other}"
        ))),
    }
}
