//! Trace Bundler Resolver
//!
//! Maps a bundler-observed import onto an instrumentation definition.
//!
//! This crate provides:
//! - [`extract`]: resolve a specifier and split the resolved path into
//!   (package, in-package path) at the last `node_modules` boundary
//! - [`filters`]: cheap predicates for imports the bundler core must skip
//!   (first-party code, externals, Node built-ins)
//! - [`registry`]: the build-once lookup from declared module names to the
//!   owning instrumentation's metadata
//! - [`matcher`]: version-aware selection of the single best-matching module
//!   definition
//! - [`version_cache`]: session-scoped cache of installed package versions
//!
//! All lookups fail open: an import that cannot be resolved, versioned, or
//! matched passes through the bundle untouched.

pub mod extract;
pub mod filters;
pub mod matcher;
pub mod registry;
pub mod version_cache;

pub use extract::{extract_package_and_module_path, node_require_resolver, Extraction};
pub use filters::{is_builtin, normalize_mjs_to_js, should_ignore_module};
pub use matcher::{find_matching_definition, range_satisfies};
pub use registry::{InstrumentationRegistry, RegistryEntry};
pub use version_cache::ModuleVersionCache;

// Re-exported so callers construct resolvers without depending on the
// resolver crate directly.
pub use oxc_resolver::{ResolveOptions, Resolver};
