//! Build-once instrumentation registry.
//!
//! Enumerates each configured instrumentation's module definitions (the
//! capability may be absent) and builds a lookup from declared module name to
//! the owning instrumentation's metadata. Computed once per build session and
//! read-only afterward.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use trace_bundler_types::{Instrumentation, ModuleDefinition};

/// Metadata for the instrumentation owning a module definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Package identifier of the owning instrumentation.
    pub package_id: String,
    /// Class name constructed in rewritten module source.
    pub class_name: String,
}

/// Lookup structures over all configured instrumentations.
#[derive(Debug, Default)]
pub struct InstrumentationRegistry {
    definitions: Vec<ModuleDefinition>,
    by_definition_name: HashMap<String, RegistryEntry>,
}

impl InstrumentationRegistry {
    /// Build the registry from the ordered instrumentation list.
    ///
    /// The flat definition list preserves instrumentation order then
    /// definition order, which is the priority order the matcher observes.
    /// Name collisions across instrumentations overwrite: last write wins.
    pub fn build(instrumentations: &[Arc<dyn Instrumentation>]) -> Self {
        let mut definitions = Vec::new();
        let mut by_definition_name = HashMap::new();

        for instrumentation in instrumentations {
            let module_definitions = instrumentation.module_definitions();
            if module_definitions.is_empty() {
                debug!(
                    package_id = instrumentation.package_id(),
                    "instrumentation declares no module definitions"
                );
            }

            for definition in module_definitions {
                by_definition_name.insert(
                    definition.name.clone(),
                    RegistryEntry {
                        package_id: instrumentation.package_id().to_string(),
                        class_name: instrumentation.class_name().to_string(),
                    },
                );
                definitions.push(definition);
            }
        }

        Self {
            definitions,
            by_definition_name,
        }
    }

    /// All definitions across all instrumentations, in priority order.
    pub fn definitions(&self) -> &[ModuleDefinition] {
        &self.definitions
    }

    /// Metadata for the instrumentation owning `definition_name`.
    pub fn entry(&self, definition_name: &str) -> Option<&RegistryEntry> {
        self.by_definition_name.get(definition_name)
    }
}
