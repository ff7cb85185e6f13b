//! Module identity and instrumentation declarations.
//!
//! An import observed during bundling is reduced to an [`ExtractedModule`]
//! (package name + in-package path). Instrumentations declare which modules
//! they patch through [`ModuleDefinition`]s; a matched import carries a
//! [`PluginData`] record from the resolve hook to the load/transform hook.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The (package, in-package path) pair derived from a resolved filesystem
/// path that crossed a `node_modules` boundary.
///
/// `package` is the npm-style specifier and may be scoped:
/// `/app/node_modules/@co/stuff/foo/bar.js` extracts to
/// `{ package: "@co/stuff", path: "foo/bar.js" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedModule {
    pub package: String,
    pub path: String,
}

impl ExtractedModule {
    pub fn new(package: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            path: path.into(),
        }
    }

    /// Reconstruct the full importable specifier, `package/path`.
    pub fn full_path(&self) -> String {
        format!("{}/{}", self.package, self.path)
    }
}

/// An instrumentation's declaration of one importable module it patches:
/// the module name, the version ranges it supports, and any per-file
/// entries with their own (usually narrower) ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDefinition {
    pub name: String,
    pub supported_versions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<ModuleFile>,
}

impl ModuleDefinition {
    pub fn new<N, V, S>(name: N, supported_versions: V, files: Vec<ModuleFile>) -> Self
    where
        N: Into<String>,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            supported_versions: supported_versions.into_iter().map(Into::into).collect(),
            files,
        }
    }
}

/// A per-file entry inside a [`ModuleDefinition`]. Lets an instrumentation
/// declare a broad version window for the module while overriding a narrower
/// window for a specific file (e.g. a file added or removed across versions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleFile {
    pub name: String,
    pub supported_versions: Vec<String>,
}

impl ModuleFile {
    pub fn new<N, V, S>(name: N, supported_versions: V) -> Self
    where
        N: Into<String>,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            supported_versions: supported_versions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Per-import state created when the resolve hook matches an instrumentation
/// and consumed when the load/transform hook rewrites the module source.
///
/// Lifetime is one module's bundling pass; nothing here is shared across
/// modules (the package-version cache lives on the build session instead).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginData {
    /// Resolved absolute path of the imported file.
    pub path: PathBuf,
    pub extracted_module: ExtractedModule,
    /// Resolved semantic version of the installed package.
    pub module_version: String,
    /// Name of the matched module definition (e.g. `"redis"`).
    pub instrumentation_name: String,
    /// Adapters check this in a later hook than the one that created the data.
    pub should_patch_package: bool,
}
