//! End-to-end pipeline tests
//!
//! Test coverage areas:
//! - Resolve-phase decisions against a real on-disk node_modules tree
//! - Match-and-rewrite flow for explicitly configured instrumentations
//! - Catalogue mode with per-package configuration overrides
//! - Fatal configuration errors (conflicting params, impure hook functions)

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use trace_bundler::{
    BuildSession, ConfigValue, Instrumentation, InstrumentationConfig, ModuleDefinition,
    PluginParams,
};

// =============================================================================
// Fixtures
// =============================================================================

struct RedisInstrumentation {
    config: Option<InstrumentationConfig>,
}

impl RedisInstrumentation {
    fn new(config: Option<InstrumentationConfig>) -> Arc<dyn Instrumentation> {
        Arc::new(Self { config })
    }
}

impl Instrumentation for RedisInstrumentation {
    fn package_id(&self) -> &str {
        "@opentelemetry/instrumentation-redis"
    }

    fn class_name(&self) -> &str {
        "RedisInstrumentation"
    }

    fn module_definitions(&self) -> Vec<ModuleDefinition> {
        vec![ModuleDefinition::new("redis", [">=4.0.0"], vec![])]
    }

    fn config(&self) -> Option<&InstrumentationConfig> {
        self.config.as_ref()
    }
}

const REDIS_SOURCE: &str = "const commands = {};\nmodule.exports = { createClient: () => commands };\n";

/// Lay out `node_modules/redis@{version}` plus an `app/` directory to
/// resolve from.
fn project_with_redis(version: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let redis = tmp.path().join("node_modules/redis");
    fs::create_dir_all(&redis).unwrap();
    fs::write(
        redis.join("package.json"),
        format!(r#"{{"name":"redis","version":"{version}","main":"index.js"}}"#),
    )
    .unwrap();
    fs::write(redis.join("index.js"), REDIS_SOURCE).unwrap();

    let app = tmp.path().join("app");
    fs::create_dir_all(&app).unwrap();
    fs::write(app.join("main.js"), "require('redis');\n").unwrap();
    (tmp, app)
}

fn importer(app: &Path) -> String {
    app.join("main.js").to_string_lossy().into_owned()
}

// =============================================================================
// Scenario A: matched import is rewritten
// =============================================================================

#[test]
fn test_matched_import_is_resolved_and_rewritten() {
    let (_tmp, app) = project_with_redis("4.2.0");
    let session = BuildSession::new(PluginParams {
        instrumentations: vec![RedisInstrumentation::new(None)],
        ..PluginParams::default()
    })
    .unwrap();

    let data = session
        .resolve_import("redis", &importer(&app), &app)
        .unwrap()
        .expect("redis@4.2.0 should match >=4.0.0");

    assert_eq!(data.extracted_module.package, "redis");
    assert_eq!(data.extracted_module.path, "index.js");
    assert_eq!(data.module_version, "4.2.0");
    assert_eq!(data.instrumentation_name, "redis");
    assert!(data.should_patch_package);
    assert!(data.path.ends_with("node_modules/redis/index.js"));

    let rewritten = session
        .rewrite_module(REDIS_SOURCE, &data)
        .unwrap()
        .expect("matched plugin data must produce rewritten source");

    // Original body evaluates unchanged, then the instrumentation patches
    // the module's own exports.
    assert!(rewritten.contains(REDIS_SOURCE));
    assert!(rewritten.contains("require('@opentelemetry/instrumentation-redis')"));
    assert!(rewritten.contains("new RedisInstrumentation()"));
    assert!(rewritten.contains("definition.name === 'redis'"));
    assert!(rewritten.contains("'4.2.0'"));
    assert!(rewritten.contains("module.exports"));
}

#[test]
fn test_version_outside_supported_range_is_a_miss() {
    let (_tmp, app) = project_with_redis("3.1.0");
    let session = BuildSession::new(PluginParams {
        instrumentations: vec![RedisInstrumentation::new(None)],
        ..PluginParams::default()
    })
    .unwrap();

    let data = session
        .resolve_import("redis", &importer(&app), &app)
        .unwrap();
    assert!(data.is_none());
}

// =============================================================================
// Scenario B: externals and other skip paths
// =============================================================================

#[test]
fn test_external_module_is_never_considered() {
    let (_tmp, app) = project_with_redis("4.2.0");
    let session = BuildSession::new(PluginParams {
        instrumentations: vec![RedisInstrumentation::new(None)],
        external_modules: vec!["redis".to_string()],
        ..PluginParams::default()
    })
    .unwrap();

    let data = session
        .resolve_import("redis", &importer(&app), &app)
        .unwrap();
    assert!(data.is_none());
}

#[test]
fn test_first_party_and_builtin_imports_pass_through() {
    let (_tmp, app) = project_with_redis("4.2.0");
    let session = BuildSession::new(PluginParams {
        instrumentations: vec![RedisInstrumentation::new(None)],
        ..PluginParams::default()
    })
    .unwrap();

    // Relative import from first-party code.
    assert!(session
        .resolve_import("./main.js", &importer(&app), &app)
        .unwrap()
        .is_none());

    // Built-in module, with and without the node: prefix.
    assert!(session
        .resolve_import("node:fs", &importer(&app), &app)
        .unwrap()
        .is_none());
}

#[test]
fn test_missing_optional_dependency_is_a_silent_miss() {
    let (_tmp, app) = project_with_redis("4.2.0");
    let session = BuildSession::new(PluginParams {
        instrumentations: vec![RedisInstrumentation::new(None)],
        ..PluginParams::default()
    })
    .unwrap();

    let data = session
        .resolve_import("kerberos", &importer(&app), &app)
        .unwrap();
    assert!(data.is_none());
}

// =============================================================================
// Scenario C: configuration embedding
// =============================================================================

#[test]
fn test_pure_hook_function_is_embedded_in_constructor_args() {
    let (_tmp, app) = project_with_redis("4.2.0");
    let hook = "(span, record) => { record.x = 1; return 1; }";
    let mut config = InstrumentationConfig::new();
    config.insert("enabled".to_string(), ConfigValue::Bool(true));
    config.insert("logHook".to_string(), ConfigValue::function(hook));

    let session = BuildSession::new(PluginParams {
        instrumentations: vec![RedisInstrumentation::new(Some(config))],
        ..PluginParams::default()
    })
    .unwrap();

    let data = session
        .resolve_import("redis", &importer(&app), &app)
        .unwrap()
        .unwrap();
    let rewritten = session.rewrite_module(REDIS_SOURCE, &data).unwrap().unwrap();

    assert!(rewritten.contains(&format!(
        r#"new RedisInstrumentation({{"enabled":true,"logHook":{hook}}})"#
    )));
}

#[test]
fn test_impure_hook_function_fails_the_build() {
    let (_tmp, app) = project_with_redis("4.2.0");
    let mut config = InstrumentationConfig::new();
    config.insert(
        "logHook".to_string(),
        ConfigValue::function("(span, record) => { record.x = outer; return 1; }"),
    );

    let session = BuildSession::new(PluginParams {
        instrumentations: vec![RedisInstrumentation::new(Some(config))],
        ..PluginParams::default()
    })
    .unwrap();

    let data = session
        .resolve_import("redis", &importer(&app), &app)
        .unwrap()
        .unwrap();

    let err = session.rewrite_module(REDIS_SOURCE, &data).unwrap_err();
    assert!(err.to_string().contains("logHook"), "{err}");
}

// =============================================================================
// Catalogue mode and parameter validation
// =============================================================================

#[test]
fn test_catalogue_mode_applies_config_overrides() {
    let (_tmp, app) = project_with_redis("4.2.0");
    let mut overrides = trace_bundler::InstrumentationConfigMap::new();
    let mut config = InstrumentationConfig::new();
    config.insert("enabled".to_string(), ConfigValue::Bool(false));
    overrides.insert("@opentelemetry/instrumentation-redis".to_string(), config);

    let session = BuildSession::with_catalogue(
        PluginParams {
            instrumentation_config: Some(overrides),
            ..PluginParams::default()
        },
        vec![RedisInstrumentation::new(None)],
    )
    .unwrap();

    let data = session
        .resolve_import("redis", &importer(&app), &app)
        .unwrap()
        .unwrap();
    let rewritten = session.rewrite_module(REDIS_SOURCE, &data).unwrap().unwrap();
    assert!(rewritten.contains(r#"new RedisInstrumentation({"enabled":false})"#));
}

#[test]
fn test_conflicting_params_fail_session_build() {
    let result = BuildSession::new(PluginParams {
        instrumentations: vec![RedisInstrumentation::new(None)],
        instrumentation_config: Some(trace_bundler::InstrumentationConfigMap::new()),
        ..PluginParams::default()
    });
    assert!(result.is_err());
}

#[test]
fn test_session_without_any_instrumentations_fails() {
    let result = BuildSession::new(PluginParams::default());
    assert!(result.is_err());
}
