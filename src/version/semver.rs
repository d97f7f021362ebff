//! Loose semantic-version utilities
//!
//! Version strings here are dot-separated integer components, optionally
//! prefixed by a range operator (`^`, `~`) and optionally carrying a
//! pre-release suffix (`-beta`, `-rc.3`, `-0`). Comparison is deliberately
//! more permissive than strict semver: any number of components is accepted,
//! missing trailing components count as zero, and unparseable components
//! compare as zero so that ordering stays total.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

/// Marker for dependencies installed from a local file path instead of the registry.
pub const LOCAL_REFERENCE_PREFIX: &str = "file:";

/// Matches a pre-release tag starting with a letter, e.g. `1.2.3-beta`, `2.0.0-rc.3`.
static ALPHA_PRERELEASE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-[a-zA-Z]").unwrap());

/// Matches a trailing numeric pre-release tag, e.g. `1.2.3-0`.
static NUMERIC_PRERELEASE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-\d+$").unwrap());

/// Returns true if the version carries no pre-release suffix.
pub fn is_stable(version: &str) -> bool {
    !ALPHA_PRERELEASE.is_match(version) && !NUMERIC_PRERELEASE.is_match(version)
}

/// Returns true if the version string points at a local file path.
pub fn is_local_reference(version: &str) -> bool {
    version.starts_with(LOCAL_REFERENCE_PREFIX)
}

/// Strip a single leading range operator (`^` or `~`) if present.
pub fn strip_range_prefix(version: &str) -> &str {
    version.strip_prefix(['^', '~']).unwrap_or(version)
}

/// Split a version string into integer components.
///
/// Unparseable components (including anything carrying a pre-release suffix,
/// like `3-rc1`) count as zero so the resulting order is total.
fn parse_components(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect()
}

/// Compare two version strings component-wise.
///
/// Leading range operators are stripped from both sides first. The shorter
/// side is padded with zeros, so `2.1` and `2.1.0` compare equal.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_parts = parse_components(strip_range_prefix(a));
    let b_parts = parse_components(strip_range_prefix(b));

    for i in 0..a_parts.len().max(b_parts.len()) {
        let a_part = a_parts.get(i).copied().unwrap_or(0);
        let b_part = b_parts.get(i).copied().unwrap_or(0);
        match a_part.cmp(&b_part) {
            Ordering::Equal => continue,
            unequal => return unequal,
        }
    }

    Ordering::Equal
}

/// Select the highest stable version from a list.
///
/// Pre-release versions are filtered out first; returns `None` when the list
/// contains no stable version at all.
pub fn select_latest_stable(versions: &[String]) -> Option<String> {
    versions
        .iter()
        .filter(|v| is_stable(v))
        .max_by(|a, b| compare_versions(a, b))
        .cloned()
}
