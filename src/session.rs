//! Per-build pipeline driving resolution, matching, and rewriting.

use anyhow::{anyhow, bail, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use trace_bundler_codegen::{serialize_config, wrap_module, WrapParams};
use trace_bundler_resolver::{
    extract_package_and_module_path, find_matching_definition, is_builtin, node_require_resolver,
    should_ignore_module, InstrumentationRegistry, ModuleVersionCache, RegistryEntry, Resolver,
};
use trace_bundler_types::{
    Instrumentation, InstrumentationConfig, InstrumentationConfigMap, ModuleDefinition, PluginData,
};

use crate::params::PluginParams;

/// One build invocation's state: the instrumentation registry, the module
/// resolver, and the package-version cache. Bundler adapters create a session
/// per build and call [`resolve_import`](Self::resolve_import) from their
/// resolve hook and [`rewrite_module`](Self::rewrite_module) from their
/// load/transform hook.
///
/// Sessions are safe to share across concurrently running resolve hooks; the
/// only mutable state is the version cache, which tolerates duplicate fills.
pub struct BuildSession {
    external_modules: Vec<String>,
    path_prefixes_to_ignore: Vec<String>,
    instrumentations: Vec<Arc<dyn Instrumentation>>,
    explicit_instrumentations: bool,
    instrumentation_config: Option<InstrumentationConfigMap>,
    registry: InstrumentationRegistry,
    resolver: Resolver,
    version_cache: ModuleVersionCache,
}

impl BuildSession {
    /// Build a session from explicitly configured instrumentations.
    pub fn new(params: PluginParams) -> Result<Self> {
        Self::with_catalogue(params, Vec::new())
    }

    /// Build a session, falling back to the adapter's default instrumentation
    /// catalogue when none were configured explicitly. The
    /// `instrumentation_config` override map applies only to the catalogue.
    pub fn with_catalogue(
        params: PluginParams,
        default_catalogue: Vec<Arc<dyn Instrumentation>>,
    ) -> Result<Self> {
        params.validate()?;

        let explicit_instrumentations = !params.instrumentations.is_empty();
        let instrumentations = if explicit_instrumentations {
            params.instrumentations
        } else if !default_catalogue.is_empty() {
            default_catalogue
        } else {
            bail!(
                "no instrumentations found: provide the `instrumentations` option or a default catalogue"
            );
        };

        let registry = InstrumentationRegistry::build(&instrumentations);

        Ok(Self {
            external_modules: params.external_modules,
            path_prefixes_to_ignore: params.path_prefixes_to_ignore,
            instrumentations,
            explicit_instrumentations,
            instrumentation_config: params.instrumentation_config,
            registry,
            resolver: node_require_resolver(),
            version_cache: ModuleVersionCache::new(),
        })
    }

    /// All module definitions known to this session, in priority order.
    pub fn definitions(&self) -> &[ModuleDefinition] {
        self.registry.definitions()
    }

    /// Decide whether an observed import should be patched.
    ///
    /// Returns `Ok(None)` for every non-fatal miss: ignored or external
    /// imports, first-party files, built-ins, unresolvable specifiers
    /// (optional peer dependencies), unversioned packages, and imports no
    /// instrumentation matches. The original source must then pass through
    /// the bundle unmodified.
    pub fn resolve_import(
        &self,
        specifier: &str,
        importer: &str,
        resolve_dir: &Path,
    ) -> Result<Option<PluginData>> {
        if should_ignore_module(
            specifier,
            importer,
            &self.external_modules,
            &self.path_prefixes_to_ignore,
        ) {
            return Ok(None);
        }

        let extraction =
            match extract_package_and_module_path(specifier, resolve_dir, &self.resolver) {
                Ok(extraction) => extraction,
                Err(err) => {
                    // Optional peer dependencies (e.g. mongodb's) are often
                    // absent without breaking the importing package.
                    debug!(specifier, error = %err, "specifier did not resolve; leaving import untouched");
                    return Ok(None);
                }
            };

        let Some(extracted_module) = extraction.module else {
            return Ok(None);
        };

        // Runtime instrumentation can still hook built-ins inside a bundle.
        if is_builtin(specifier, &extracted_module) {
            return Ok(None);
        }

        let Some(module_version) =
            self.version_cache
                .module_version(&extracted_module, resolve_dir, &self.resolver)
        else {
            debug!(
                package = extracted_module.package.as_str(),
                "package version unavailable; leaving import untouched"
            );
            return Ok(None);
        };

        let Some(definition) = find_matching_definition(
            self.registry.definitions(),
            &extracted_module,
            specifier,
            &module_version,
        ) else {
            debug!(
                package = extracted_module.package.as_str(),
                module_version = module_version.as_str(),
                "no instrumentation matches"
            );
            return Ok(None);
        };

        debug!(
            package = extracted_module.package.as_str(),
            module_version = module_version.as_str(),
            instrumentation = definition.name.as_str(),
            "instrumentation matched"
        );

        Ok(Some(PluginData {
            path: extraction.path,
            extracted_module,
            module_version,
            instrumentation_name: definition.name.clone(),
            should_patch_package: true,
        }))
    }

    /// Rewrite a matched module's source so that loading it also patches its
    /// exports.
    ///
    /// Returns `Ok(None)` when the plugin data does not call for patching.
    /// Fails when the matched instrumentation's configuration cannot be
    /// embedded (impure or malformed function values) or when the requested
    /// package is missing from an explicitly configured instrumentation list.
    pub fn rewrite_module(&self, source: &str, data: &PluginData) -> Result<Option<String>> {
        if !data.should_patch_package {
            return Ok(None);
        }
        let Some(entry) = self.registry.entry(&data.instrumentation_name) else {
            return Ok(None);
        };

        let package_config = self.package_config(entry)?;
        let constructor_args = serialize_config(package_config.as_ref())?;
        let full_path = data.extracted_module.full_path();

        Ok(Some(wrap_module(
            source,
            &WrapParams {
                path: &full_path,
                module_version: &data.module_version,
                instrumentation_name: &data.instrumentation_name,
                class_name: &entry.class_name,
                package_id: &entry.package_id,
                constructor_args: constructor_args.as_deref(),
            },
        )))
    }

    /// The configuration to embed for the instrumentation owning a matched
    /// definition.
    fn package_config(&self, entry: &RegistryEntry) -> Result<Option<InstrumentationConfig>> {
        if self.explicit_instrumentations {
            let instrumentation = self
                .instrumentations
                .iter()
                .find(|candidate| candidate.package_id() == entry.package_id)
                .ok_or_else(|| {
                    anyhow!(
                        "instrumentation {} was matched but does not exist in the configured instrumentation list",
                        entry.package_id
                    )
                })?;
            return Ok(instrumentation.config().cloned());
        }

        Ok(self
            .instrumentation_config
            .as_ref()
            .and_then(|overrides| overrides.get(&entry.package_id))
            .cloned())
    }
}
