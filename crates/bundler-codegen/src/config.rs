//! Configuration serialization.
//!
//! Turns an instrumentation's configuration into source text that can be
//! embedded in a rewritten module. Plain data serializes as JSON. Function
//! values are not representable in JSON, so serialization runs in two
//! passes: each function is purity-checked and replaced by a UUID-based
//! placeholder string during the JSON pass, then the quoted placeholder is
//! substituted with the raw function source. The random placeholder cannot
//! collide with literal user data, unlike a counter-based token.

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use uuid::Uuid;

use crate::purity::check_function_source;
use trace_bundler_types::{ConfigValue, InstrumentationConfig};

/// Serialize a configuration object to embeddable source text.
///
/// Returns `Ok(None)` when no configuration was supplied. Fails when any
/// function value is impure or malformed; an impure function cannot be
/// reproduced faithfully as standalone source, and dropping it silently
/// would change instrumentation behavior at runtime.
pub fn serialize_config(config: Option<&InstrumentationConfig>) -> Result<Option<String>> {
    let Some(config) = config else {
        return Ok(None);
    };

    let mut embedded_functions: Vec<(String, String)> = Vec::new();
    let mut object = serde_json::Map::new();
    for (key, value) in config {
        object.insert(key.clone(), encode_value(key, value, &mut embedded_functions)?);
    }

    let mut text = serde_json::to_string(&Value::Object(object))
        .context("failed to serialize instrumentation configuration")?;
    for (placeholder, source) in &embedded_functions {
        let quoted = format!("\"{placeholder}\"");
        text = text.replacen(&quoted, source, 1);
    }

    Ok(Some(text))
}

fn encode_value(
    key: &str,
    value: &ConfigValue,
    embedded_functions: &mut Vec<(String, String)>,
) -> Result<Value> {
    Ok(match value {
        ConfigValue::Null => Value::Null,
        ConfigValue::Bool(value) => Value::Bool(*value),
        ConfigValue::Number(value) => encode_number(key, *value)?,
        ConfigValue::String(value) => Value::String(value.clone()),
        ConfigValue::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| encode_value(key, item, embedded_functions))
                .collect::<Result<_>>()?,
        ),
        ConfigValue::Object(entries) => {
            let mut object = serde_json::Map::new();
            for (name, entry) in entries {
                object.insert(name.clone(), encode_value(name, entry, embedded_functions)?);
            }
            Value::Object(object)
        }
        ConfigValue::Function(function) => {
            let purity = check_function_source(&function.source).with_context(|| {
                format!("configuration option `{key}` has malformed function source")
            })?;
            if !purity.is_pure() {
                if purity.references_this {
                    bail!("configuration option `{key}` must be a pure function: it references `this`");
                }
                bail!(
                    "configuration option `{key}` must be a pure function: it closes over {}",
                    purity.closed_over.join(", ")
                );
            }
            let placeholder = function_placeholder();
            embedded_functions.push((placeholder.clone(), function.source.clone()));
            Value::String(placeholder)
        }
    })
}

fn encode_number(key: &str, value: f64) -> Result<Value> {
    // Keep integral values as integers so the embedded source reads the way
    // the user wrote it.
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
        return Ok(Value::Number(serde_json::Number::from(value as i64)));
    }
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| anyhow!("configuration option `{key}` is not a finite number"))
}

fn function_placeholder() -> String {
    format!("__fn_placeholder_{}__", Uuid::new_v4().simple())
}
