//! The capability interface an instrumentation exposes to the bundler core.

use crate::config::InstrumentationConfig;
use crate::module::ModuleDefinition;

/// A tracing instrumentation as seen by the bundler core: a stable package
/// identifier, the class name to construct in rewritten module source, and
/// optional capabilities for listing module definitions and exposing the
/// currently configured options.
///
/// `module_definitions` and `config` have default bodies so that minimal
/// instrumentation descriptors only implement the identity methods. The
/// registry builder probes the capability once per build rather than per
/// lookup.
pub trait Instrumentation: Send + Sync {
    /// Stable package identifier, e.g. `"@opentelemetry/instrumentation-redis"`.
    fn package_id(&self) -> &str;

    /// Concrete class name constructed by rewritten module source,
    /// e.g. `"RedisInstrumentation"`.
    fn class_name(&self) -> &str;

    /// The module definitions this instrumentation patches. Empty when the
    /// capability is absent.
    fn module_definitions(&self) -> Vec<ModuleDefinition> {
        Vec::new()
    }

    /// The currently configured options, if any.
    fn config(&self) -> Option<&InstrumentationConfig> {
        None
    }
}
