//! Version-aware selection of the best-matching module definition.
//!
//! A definition is a name candidate when its declared name equals either the
//! raw specifier or the reconstructed `package/path`; failing that, a per-file
//! entry with one of those names keeps it a candidate. A candidate matches
//! when its module-wide ranges accept the installed version, or when a
//! matching per-file entry's own ranges do. The two-level check lets an
//! instrumentation declare a broad window for most patched files and override
//! narrower windows for files that moved across versions.

use semver::{Version, VersionReq};
use tracing::debug;

use trace_bundler_types::{ExtractedModule, ModuleDefinition};

/// True when `range` (npm syntax) accepts `version`.
///
/// npm ranges allow `||` alternatives, space-separated comparator sets,
/// hyphen ranges (`1.2.3 - 2.0.0`), and partial versions (`4.2` means
/// `4.2.x`), none of which `semver::VersionReq` parses with npm semantics;
/// each alternative is normalized to comma-joined comparators first. A bare
/// full version pins exactly, as in npm. A range that still fails to parse
/// never satisfies.
pub fn range_satisfies(range: &str, version: &Version) -> bool {
    range.split("||").any(|alternative| {
        let alternative = alternative.trim();
        if alternative.is_empty() || alternative == "*" {
            return true;
        }
        if let Ok(exact) = Version::parse(alternative) {
            return *version == exact;
        }

        let normalized = if let Some((lower, upper)) = alternative.split_once(" - ") {
            match hyphen_range_comparators(lower.trim(), upper.trim()) {
                Some(comparators) => comparators,
                None => {
                    debug!(range = alternative, "malformed hyphen range never satisfies");
                    return false;
                }
            }
        } else if let Some(completed) = partial_version_range(alternative) {
            completed
        } else {
            alternative.split_whitespace().collect::<Vec<_>>().join(", ")
        };

        match VersionReq::parse(&normalized) {
            Ok(req) => req.matches(version),
            Err(err) => {
                debug!(range = alternative, error = %err, "unparseable version range never satisfies");
                false
            }
        }
    })
}

/// Translate an npm hyphen range `lower - upper` into comparators. Partial
/// bounds complete the way npm does: a partial lower bound fills with zeros
/// (`1.2 -` becomes `>=1.2.0`), a partial upper bound excludes the next
/// series (`- 2.3` becomes `<2.4.0`, `- 2` becomes `<3.0.0`).
fn hyphen_range_comparators(lower: &str, upper: &str) -> Option<String> {
    if upper.contains(" - ") {
        return None;
    }
    let mut comparators = Vec::new();

    if !lower.is_empty() && lower != "*" {
        if Version::parse(lower).is_ok() {
            comparators.push(format!(">={lower}"));
        } else {
            let parts = version_segments(lower)?;
            let major = parts.first().copied().unwrap_or(0);
            let minor = parts.get(1).copied().unwrap_or(0);
            let patch = parts.get(2).copied().unwrap_or(0);
            comparators.push(format!(">={major}.{minor}.{patch}"));
        }
    }

    if !upper.is_empty() && upper != "*" {
        if Version::parse(upper).is_ok() {
            comparators.push(format!("<={upper}"));
        } else {
            match version_segments(upper)?.as_slice() {
                [major] => comparators.push(format!("<{}.0.0", major + 1)),
                [major, minor] => comparators.push(format!("<{major}.{}.0", minor + 1)),
                [major, minor, patch] => comparators.push(format!("<={major}.{minor}.{patch}")),
                [] => {}
                _ => return None,
            }
        }
    }

    if comparators.is_empty() {
        return Some("*".to_string());
    }
    Some(comparators.join(", "))
}

/// Numeric leading segments of a partial version, stopping at a wildcard.
fn version_segments(text: &str) -> Option<Vec<u64>> {
    let mut parts = Vec::new();
    for segment in text.split('.') {
        if matches!(segment, "x" | "X" | "*") {
            break;
        }
        parts.push(segment.parse().ok()?);
        if parts.len() == 3 {
            break;
        }
    }
    Some(parts)
}

/// npm treats a bare `major.minor` as the x-range `major.minor.x`, while
/// `semver::VersionReq` would read it as a caret requirement. Single-segment
/// versions need no rewrite: `^4` and npm's `4.x` accept the same set.
fn partial_version_range(text: &str) -> Option<String> {
    let (major, minor) = text.split_once('.')?;
    if major.is_empty()
        || minor.is_empty()
        || !major.bytes().all(|b| b.is_ascii_digit())
        || !minor.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let next_minor: u64 = minor.parse::<u64>().ok()? + 1;
    Some(format!(">={text}.0, <{major}.{next_minor}.0"))
}

fn any_range_satisfies(ranges: &[String], version: &Version) -> bool {
    ranges.iter().any(|range| range_satisfies(range, version))
}

/// Find the first definition (in list order) matching the extracted module at
/// the installed version. Returns `None` when nothing matches, including when
/// the installed version is not valid semver.
pub fn find_matching_definition<'a>(
    definitions: &'a [ModuleDefinition],
    extracted_module: &ExtractedModule,
    path: &str,
    module_version: &str,
) -> Option<&'a ModuleDefinition> {
    let version = match Version::parse(module_version) {
        Ok(version) => version,
        Err(err) => {
            debug!(
                package = extracted_module.package.as_str(),
                module_version,
                error = %err,
                "installed version is not valid semver; skipping match"
            );
            return None;
        }
    };
    let full_module_path = extracted_module.full_path();

    for definition in definitions {
        let name_matches = definition.name == path || definition.name == full_module_path;

        if !name_matches {
            let file_match = definition
                .files
                .iter()
                .any(|file| file.name == path || file.name == full_module_path);
            if !file_match {
                continue;
            }
        }

        if any_range_satisfies(&definition.supported_versions, &version) {
            return Some(definition);
        }

        if definition.files.iter().any(|file| {
            (file.name == path || file.name == full_module_path)
                && any_range_satisfies(&file.supported_versions, &version)
        }) {
            return Some(definition);
        }
    }

    None
}
