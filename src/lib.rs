//! Trace Bundler
//!
//! Statically rewrites imported third-party modules at bundle time so that
//! tracing instrumentation — normally applied by hooking `require` at
//! runtime — also works inside bundled, single-file deployments.
//!
//! The core is bundler-agnostic. An adapter wires its bundler's plugin hooks
//! to a [`BuildSession`]:
//! - the resolve hook calls [`BuildSession::resolve_import`], which maps the
//!   observed import onto an instrumentation module definition (or decides to
//!   leave it untouched);
//! - the load/transform hook calls [`BuildSession::rewrite_module`], which
//!   replaces the module's source with a version that constructs the matched
//!   instrumentation and patches the module's own exports at load time.
//!
//! Per observed import the pipeline is a one-way state machine:
//! `Unseen -> Extracted -> {Ignored | BuiltIn | Unversioned | NoMatch} ->
//! Matched -> Rewritten`; every terminal state other than `Rewritten` passes
//! the original source through unmodified.
//!
//! Workspace crates:
//! - `trace-bundler-types`: shared data model and the [`Instrumentation`]
//!   capability trait
//! - `trace-bundler-resolver`: path extraction, filters, version matching,
//!   and the instrumentation registry
//! - `trace-bundler-codegen`: purity checking, configuration serialization,
//!   and the module rewriter

pub mod params;
pub mod session;

pub use params::PluginParams;
pub use session::BuildSession;

// Re-export the pieces adapters and instrumentation descriptors interact
// with, so most consumers depend on this crate alone.
pub use trace_bundler_codegen::{
    check_function_source, is_pure_function, serialize_config, wrap_module, Purity, WrapParams,
};
pub use trace_bundler_resolver::{
    extract_package_and_module_path, find_matching_definition, is_builtin, node_require_resolver,
    normalize_mjs_to_js, should_ignore_module, Extraction, InstrumentationRegistry,
    ModuleVersionCache, RegistryEntry,
};
pub use trace_bundler_types::{
    ConfigValue, ExtractedModule, Instrumentation, InstrumentationConfig,
    InstrumentationConfigMap, ModuleDefinition, ModuleFile, PluginData,
};
