//! Module path extraction.
//!
//! For a given import specifier, resolve it the way `require` would and
//! decide whether the resolved file lives inside a dependency root. If it
//! does, split the path into the owning package name and the in-package
//! file path:
//!   input:  `/foo/node_modules/@co/stuff/foo/bar/baz.js`
//!   output: `{ package: "@co/stuff", path: "foo/bar/baz.js" }`

use anyhow::{anyhow, Result};
use oxc_resolver::{ResolveOptions, Resolver};
use std::path::{Path, PathBuf};

use trace_bundler_types::ExtractedModule;

/// Dependency-root marker segment in resolved paths.
pub const NODE_MODULES: &str = "/node_modules/";

/// Result of resolving one specifier: the absolute path, plus the extracted
/// module when the path crossed a `node_modules` boundary. First-party files
/// resolve with `module: None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub path: PathBuf,
    pub module: Option<ExtractedModule>,
}

/// Build a resolver with CommonJS `require` semantics, matching what the
/// hosting bundlers use for dependency resolution.
pub fn node_require_resolver() -> Resolver {
    Resolver::new(ResolveOptions {
        condition_names: vec!["node".to_string(), "require".to_string()],
        ..ResolveOptions::default()
    })
}

/// Resolve `specifier` from `resolve_dir` and extract its package identity.
///
/// Fails when the specifier cannot be resolved at all. Callers must treat
/// that as a non-fatal miss: optional peer dependencies (e.g. `mongodb`'s)
/// are routinely absent without breaking the importing package.
pub fn extract_package_and_module_path(
    specifier: &str,
    resolve_dir: &Path,
    resolver: &Resolver,
) -> Result<Extraction> {
    // `require.resolve(".")` and `".."` misbehave; Node wants the trailing
    // slash forms. See nodejs/node#47000.
    let specifier = match specifier {
        "." => "./",
        ".." => "../",
        other => other,
    };

    let resolution = resolver.resolve(resolve_dir, specifier).map_err(|err| {
        anyhow!(
            "failed to resolve {} from {}: {}",
            specifier,
            resolve_dir.display(),
            err
        )
    })?;
    let path = resolution.full_path();
    let module = split_at_dependency_root(&path);

    Ok(Extraction { path, module })
}

/// Split a resolved path at the *last* `node_modules` segment. Returns `None`
/// for paths outside any dependency root.
fn split_at_dependency_root(path: &Path) -> Option<ExtractedModule> {
    let text = path.to_string_lossy();
    let marker = text.rfind(NODE_MODULES)?;
    let remainder = &text[marker + NODE_MODULES.len()..];

    // A scoped package name (@scope/name) consumes two path segments, an
    // unscoped name consumes one.
    let first_slash = remainder.find('/')?;
    if !remainder.starts_with('@') {
        return Some(ExtractedModule::new(
            &remainder[..first_slash],
            &remainder[first_slash + 1..],
        ));
    }

    let second_slash = remainder[first_slash + 1..].find('/')?;
    Some(ExtractedModule::new(
        &remainder[..first_slash + 1 + second_slash],
        &remainder[first_slash + second_slash + 2..],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_package(root: &Path, package: &str, version: &str, files: &[(&str, &str)]) {
        let dir = root.join("node_modules").join(package);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("package.json"),
            format!(r#"{{"name":"{package}","version":"{version}","main":"index.js"}}"#),
        )
        .unwrap();
        for (name, contents) in files {
            let file = dir.join(name);
            fs::create_dir_all(file.parent().unwrap()).unwrap();
            fs::write(file, contents).unwrap();
        }
    }

    fn app_dir(root: &Path) -> PathBuf {
        let dir = root.join("app");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("local.js"), "module.exports = 1;\n").unwrap();
        dir
    }

    #[test]
    fn test_unscoped_package_extraction() {
        let tmp = TempDir::new().unwrap();
        write_package(tmp.path(), "redis", "4.2.0", &[("index.js", "module.exports = {};\n")]);
        let app = app_dir(tmp.path());

        let resolver = node_require_resolver();
        let extraction = extract_package_and_module_path("redis", &app, &resolver).unwrap();

        assert_eq!(
            extraction.module,
            Some(ExtractedModule::new("redis", "index.js"))
        );
        assert!(extraction.path.ends_with("node_modules/redis/index.js"));
    }

    #[test]
    fn test_scoped_package_extraction() {
        let tmp = TempDir::new().unwrap();
        write_package(
            tmp.path(),
            "@co/stuff",
            "1.0.0",
            &[("foo/bar/baz.js", "module.exports = {};\n")],
        );
        let app = app_dir(tmp.path());

        let resolver = node_require_resolver();
        let extraction =
            extract_package_and_module_path("@co/stuff/foo/bar/baz.js", &app, &resolver).unwrap();

        assert_eq!(
            extraction.module,
            Some(ExtractedModule::new("@co/stuff", "foo/bar/baz.js"))
        );
    }

    #[test]
    fn test_first_party_file_has_no_extracted_module() {
        let tmp = TempDir::new().unwrap();
        let app = app_dir(tmp.path());

        let resolver = node_require_resolver();
        let extraction = extract_package_and_module_path("./local.js", &app, &resolver).unwrap();

        assert_eq!(extraction.module, None);
        assert!(extraction.path.ends_with("app/local.js"));
    }

    #[test]
    fn test_dot_specifier_resolves_as_directory() {
        let tmp = TempDir::new().unwrap();
        let app = app_dir(tmp.path());
        fs::write(app.join("index.js"), "module.exports = 1;\n").unwrap();

        let resolver = node_require_resolver();
        let extraction = extract_package_and_module_path(".", &app, &resolver).unwrap();

        assert_eq!(extraction.module, None);
        assert!(extraction.path.ends_with("app/index.js"));
    }

    #[test]
    fn test_unresolvable_specifier_propagates_error() {
        let tmp = TempDir::new().unwrap();
        let app = app_dir(tmp.path());

        let resolver = node_require_resolver();
        let result = extract_package_and_module_path("missing-optional-peer", &app, &resolver);
        assert!(result.is_err());
    }

    #[test]
    fn test_last_node_modules_segment_wins() {
        let nested = Path::new(
            "/app/node_modules/outer/node_modules/@co/inner/lib/a.js",
        );
        assert_eq!(
            split_at_dependency_root(nested),
            Some(ExtractedModule::new("@co/inner", "lib/a.js"))
        );
    }

    #[test]
    fn test_path_without_marker_splits_to_none() {
        assert_eq!(split_at_dependency_root(Path::new("/app/src/index.js")), None);
    }
}
