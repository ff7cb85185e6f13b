//! Module rewriter.
//!
//! Produces the replacement source for a matched dependency module. The
//! rewritten text evaluates the original module body unchanged inside an
//! IIFE applied over the CommonJS wrapper's `arguments`, then constructs the
//! matched instrumentation and applies its patch entry points to the
//! module's own exports before re-exporting them. Assumes the module's
//! emitted form is CommonJS; other formats must be transpiled upstream.

/// Identity and configuration of the instrumentation to weave into a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapParams<'a> {
    /// Importable path of the patched file, `package/path`
    /// (e.g. `"redis/dist/commands.js"`).
    pub path: &'a str,
    /// Installed version of the package, passed to the patch entry points.
    pub module_version: &'a str,
    /// Name of the matched module definition (e.g. `"redis"`).
    pub instrumentation_name: &'a str,
    /// Class exported by the instrumentation package.
    pub class_name: &'a str,
    /// Package to `require` the class from.
    pub package_id: &'a str,
    /// Serialized constructor arguments, or `None` for a bare constructor
    /// call.
    pub constructor_args: Option<&'a str>,
}

/// Rewrite `source` so that loading the module also patches its exports.
pub fn wrap_module(source: &str, params: &WrapParams<'_>) -> String {
    let WrapParams {
        path,
        module_version,
        instrumentation_name,
        class_name,
        package_id,
        constructor_args,
    } = params;
    let constructor_args = constructor_args.unwrap_or("");

    format!(
        r#"(function() {{
{source}
}})(...arguments);
{{
  const {{ {class_name} }} = require('{package_id}');
  const instrumentation = new {class_name}({constructor_args});
  const moduleDefinitions = typeof instrumentation.getModuleDefinitions === 'function'
    ? instrumentation.getModuleDefinitions()
    : [];
  const moduleDefinition = moduleDefinitions.find(
    (definition) => definition.name === '{instrumentation_name}'
  );
  if (moduleDefinition) {{
    if (typeof moduleDefinition.patch === 'function') {{
      module.exports = moduleDefinition.patch(module.exports, '{module_version}') ?? module.exports;
    }}
    for (const file of moduleDefinition.files ?? []) {{
      if (file.name === '{path}' && typeof file.patch === 'function') {{
        module.exports = file.patch(module.exports, '{module_version}') ?? module.exports;
      }}
    }}
  }}
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params<'a>(constructor_args: Option<&'a str>) -> WrapParams<'a> {
        WrapParams {
            path: "redis/index.js",
            module_version: "4.2.0",
            instrumentation_name: "redis",
            class_name: "RedisInstrumentation",
            package_id: "@opentelemetry/instrumentation-redis",
            constructor_args,
        }
    }

    #[test]
    fn test_original_source_is_preserved_verbatim() {
        let source = "const client = {};\nmodule.exports = { createClient: () => client };";
        let wrapped = wrap_module(source, &params(None));
        assert!(wrapped.contains(source));
        assert!(wrapped.starts_with("(function() {"));
        assert!(wrapped.contains("})(...arguments);"));
    }

    #[test]
    fn test_constructs_instrumentation_from_its_package() {
        let wrapped = wrap_module("module.exports = {};", &params(None));
        assert!(wrapped.contains("require('@opentelemetry/instrumentation-redis')"));
        assert!(wrapped.contains("new RedisInstrumentation()"));
        assert!(wrapped.contains("definition.name === 'redis'"));
        assert!(wrapped.contains("module.exports = moduleDefinition.patch(module.exports, '4.2.0')"));
    }

    #[test]
    fn test_constructor_args_are_spliced_unquoted() {
        let args = r#"{"enabled":true,"logHook":(span, record) => { record.x = 1; return 1; }}"#;
        let wrapped = wrap_module("module.exports = {};", &params(Some(args)));
        assert!(wrapped.contains(&format!("new RedisInstrumentation({args})")));
    }

    #[test]
    fn test_file_patch_compares_full_path() {
        let wrapped = wrap_module("module.exports = {};", &params(None));
        assert!(wrapped.contains("file.name === 'redis/index.js'"));
    }
}
