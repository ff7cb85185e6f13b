//! Instrumentation configuration values.
//!
//! Configuration is plain structured data plus an escape hatch for
//! user-supplied hook functions carried as JavaScript source text. Function
//! values are only ever embedded into generated code after passing the purity
//! check in the codegen crate; this module just models the tree.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One instrumentation's configuration object, keyed by option name.
pub type InstrumentationConfig = BTreeMap<String, ConfigValue>;

/// Per-package configuration overrides, keyed by instrumentation package id
/// (e.g. `"@opentelemetry/instrumentation-pino"`).
pub type InstrumentationConfigMap = BTreeMap<String, InstrumentationConfig>;

/// A configuration value: JSON-shaped data, or the source text of a
/// JavaScript function to embed verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<ConfigValue>),
    /// JavaScript function source, e.g. `"(span, record) => { ... }"`.
    /// Listed before `Object` so untagged deserialization does not swallow
    /// `{"source": ...}` maps.
    Function(FunctionSource),
    Object(BTreeMap<String, ConfigValue>),
}

/// Wrapper distinguishing function source from an ordinary string value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSource {
    pub source: String,
}

impl ConfigValue {
    /// A function value from its JavaScript source text.
    pub fn function(source: impl Into<String>) -> Self {
        ConfigValue::Function(FunctionSource {
            source: source.into(),
        })
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Number(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Number(value as f64)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_impls() {
        assert_eq!(ConfigValue::from(true), ConfigValue::Bool(true));
        assert_eq!(ConfigValue::from(3_i64), ConfigValue::Number(3.0));
        assert_eq!(
            ConfigValue::from("traceId"),
            ConfigValue::String("traceId".to_string())
        );
    }

    #[test]
    fn test_function_value_keeps_source_verbatim() {
        let value = ConfigValue::function("(span) => span");
        match value {
            ConfigValue::Function(f) => assert_eq!(f.source, "(span) => span"),
            other => panic!("expected function value, got {other:?}"),
        }
    }
}
