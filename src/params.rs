//! Plugin parameters shared by all bundler adapters.

use anyhow::{bail, Result};
use std::sync::Arc;

use trace_bundler_types::{Instrumentation, InstrumentationConfigMap};

/// Configuration surface consumed by a [`crate::BuildSession`].
///
/// `instrumentations` and `instrumentation_config` are mutually exclusive:
/// explicitly supplied instrumentations already carry their configuration,
/// while the override map configures a catalogue owned by the adapter.
#[derive(Default)]
pub struct PluginParams {
    /// Explicitly configured instrumentations. When non-empty, these are the
    /// only instrumentations considered.
    pub instrumentations: Vec<Arc<dyn Instrumentation>>,
    /// Per-package configuration overrides applied to the adapter's default
    /// catalogue.
    pub instrumentation_config: Option<InstrumentationConfigMap>,
    /// Specifiers to consider external and leave untouched.
    pub external_modules: Vec<String>,
    /// Specifier prefixes to leave untouched (e.g. a `~/` path alias).
    pub path_prefixes_to_ignore: Vec<String>,
}

impl PluginParams {
    pub(crate) fn validate(&self) -> Result<()> {
        if !self.instrumentations.is_empty() && self.instrumentation_config.is_some() {
            bail!("`instrumentations` and `instrumentation_config` must not be used together");
        }
        Ok(())
    }
}

impl std::fmt::Debug for PluginParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginParams")
            .field(
                "instrumentations",
                &self
                    .instrumentations
                    .iter()
                    .map(|i| i.package_id().to_string())
                    .collect::<Vec<_>>(),
            )
            .field("instrumentation_config", &self.instrumentation_config)
            .field("external_modules", &self.external_modules)
            .field("path_prefixes_to_ignore", &self.path_prefixes_to_ignore)
            .finish()
    }
}
