//! Update decision policy
//!
//! Decides whether an installed dependency should be replaced by a registry
//! release. Pure function over strings and lists; all process and filesystem
//! work happens in the surrounding command flows.

use std::cmp::Ordering;

use crate::version::semver::{
    compare_versions, is_local_reference, select_latest_stable, strip_range_prefix,
};

/// Why an update is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateReason {
    /// The installed dependency points at a local file path.
    Local,
    /// A specific version was requested, bypassing comparison.
    Explicit,
    /// The registry has a newer stable release than the installed one.
    Newer,
}

/// Result of an update decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDecision {
    pub should_update: bool,
    /// Set when `should_update` is true.
    pub reason: Option<UpdateReason>,
    /// The version an update would install: the requested version verbatim,
    /// or the latest stable registry release.
    pub latest_available: Option<String>,
}

impl UpdateDecision {
    fn update(reason: UpdateReason, latest_available: Option<String>) -> Self {
        Self {
            should_update: true,
            reason: Some(reason),
            latest_available,
        }
    }

    fn keep() -> Self {
        Self {
            should_update: false,
            reason: None,
            latest_available: None,
        }
    }
}

/// Decide whether the installed dependency should be replaced.
///
/// Policy, in order:
/// 1. a local file reference is always replaced (reason [`UpdateReason::Local`]);
/// 2. an explicitly requested version is always installed verbatim
///    (reason [`UpdateReason::Explicit`]);
/// 3. otherwise the latest stable registry release wins if it is strictly
///    newer than the installed version (reason [`UpdateReason::Newer`]).
///
/// An empty registry list means "no newer version known", so only the
/// local-reference check can still trigger an update. An absent installed
/// version decides conservatively against updating.
pub fn needs_update(
    installed: Option<&str>,
    registry_versions: &[String],
    requested: Option<&str>,
) -> UpdateDecision {
    if let Some(installed) = installed
        && is_local_reference(installed)
    {
        return UpdateDecision::update(
            UpdateReason::Local,
            select_latest_stable(registry_versions),
        );
    }

    if let Some(requested) = requested {
        return UpdateDecision::update(UpdateReason::Explicit, Some(requested.to_string()));
    }

    let Some(installed) = installed else {
        return UpdateDecision::keep();
    };

    let Some(latest) = select_latest_stable(registry_versions) else {
        return UpdateDecision::keep();
    };

    if compare_versions(&latest, strip_range_prefix(installed)) == Ordering::Greater {
        UpdateDecision::update(UpdateReason::Newer, Some(latest))
    } else {
        UpdateDecision::keep()
    }
}
