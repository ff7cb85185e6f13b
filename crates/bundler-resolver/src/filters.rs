//! Cheap predicates over observed imports.
//!
//! These run before any filesystem or registry work: first-party imports,
//! configured externals/prefixes, and Node built-in modules are never
//! candidates for rewriting. Built-ins are left to runtime instrumentation,
//! which can still hook them in a bundled app.

use crate::extract::NODE_MODULES;
use trace_bundler_types::ExtractedModule;

/// Node's built-in module names, without the `node:` namespace prefix.
/// Mirrors `require("module").builtinModules`.
const BUILTIN_MODULES: &[&str] = &[
    "assert",
    "assert/strict",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "dns/promises",
    "domain",
    "events",
    "fs",
    "fs/promises",
    "http",
    "http2",
    "https",
    "inspector",
    "inspector/promises",
    "module",
    "net",
    "os",
    "path",
    "path/posix",
    "path/win32",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "readline/promises",
    "repl",
    "stream",
    "stream/consumers",
    "stream/promises",
    "stream/web",
    "string_decoder",
    "sys",
    "timers",
    "timers/promises",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "util/types",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

fn is_builtin_name(name: &str) -> bool {
    let bare = name.strip_prefix("node:").unwrap_or(name);
    BUILTIN_MODULES.contains(&bare)
}

/// True when the raw specifier or the reconstructed `package/path` names a
/// Node built-in module, with or without the `node:` prefix.
pub fn is_builtin(path: &str, extracted_module: &ExtractedModule) -> bool {
    is_builtin_name(path) || is_builtin_name(&extracted_module.full_path())
}

/// True when an import must be skipped entirely:
/// - a relative import from a non-dependency importer (first-party code),
/// - a specifier starting with a configured ignore prefix,
/// - a specifier configured as external.
pub fn should_ignore_module(
    path: &str,
    importer: &str,
    external_modules: &[String],
    path_prefixes_to_ignore: &[String],
) -> bool {
    if !importer.contains(NODE_MODULES) && path.starts_with('.') {
        return true;
    }
    if path_prefixes_to_ignore
        .iter()
        .any(|prefix| path.starts_with(prefix.as_str()))
    {
        return true;
    }
    external_modules.iter().any(|external| external == path)
}

/// Normalize an `.mjs` filename to its `.js` twin. Bundlers that resolve to
/// `.mjs` entry points (webpack) apply this before matching, since module
/// definitions are declared against `.js` paths.
pub fn normalize_mjs_to_js(filename: &str) -> String {
    match filename.strip_suffix(".mjs") {
        Some(stem) => format!("{stem}.js"),
        None => filename.to_string(),
    }
}
