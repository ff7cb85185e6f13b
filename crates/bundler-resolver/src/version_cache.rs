//! Session-scoped cache of installed package versions.
//!
//! A build observes one dependency tree, so the installed version of a
//! package never changes mid-build and the cache is never invalidated.
//! Resolve hooks can run concurrently; the check-then-set here is best-effort
//! rather than atomic, and a duplicate fill just re-reads an identical
//! manifest.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;

use oxc_resolver::Resolver;
use tracing::debug;

use trace_bundler_types::ExtractedModule;

/// Maps a package's manifest request (`"{package}/package.json"`) to its
/// resolved semantic version string. Owned by one build session.
#[derive(Debug, Default)]
pub struct ModuleVersionCache {
    versions: Mutex<HashMap<String, String>>,
}

impl ModuleVersionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the installed version of `extracted_module`'s package, reading
    /// and caching its manifest on first use.
    ///
    /// Returns `None` when the manifest cannot be resolved, read, or parsed,
    /// or carries no version field. All of these are non-fatal: the enclosing
    /// import is simply left unpatched.
    pub fn module_version(
        &self,
        extracted_module: &ExtractedModule,
        resolve_dir: &Path,
        resolver: &Resolver,
    ) -> Option<String> {
        let request = format!("{}/package.json", extracted_module.package);

        if let Some(version) = self.versions.lock().get(&request) {
            return Some(version.clone());
        }

        let version = read_manifest_version(&request, resolve_dir, resolver)?;
        self.versions.lock().insert(request, version.clone());
        Some(version)
    }

    /// Number of cached package versions.
    pub fn len(&self) -> usize {
        self.versions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.lock().is_empty()
    }
}

fn read_manifest_version(request: &str, resolve_dir: &Path, resolver: &Resolver) -> Option<String> {
    let manifest_path = match resolver.resolve(resolve_dir, request) {
        Ok(resolution) => resolution.full_path(),
        Err(err) => {
            debug!(request, error = %err, "package manifest did not resolve");
            return None;
        }
    };

    let contents = match std::fs::read_to_string(&manifest_path) {
        Ok(contents) => contents,
        Err(err) => {
            debug!(path = %manifest_path.display(), error = %err, "failed to read package manifest");
            return None;
        }
    };

    let manifest: serde_json::Value = match serde_json::from_str(&contents) {
        Ok(manifest) => manifest,
        Err(err) => {
            debug!(path = %manifest_path.display(), error = %err, "package manifest is not valid JSON");
            return None;
        }
    };

    manifest
        .get("version")
        .and_then(|version| version.as_str())
        .map(str::to_string)
}
