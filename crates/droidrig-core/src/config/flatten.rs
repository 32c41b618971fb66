//! Flattening of nested key/value documents into capability entries.
//!
//! Nested objects produce dotted keys (`server.host`), arrays produce
//! indexed keys (`drivers.emulators[0].deviceName`). Both JSON and YAML are
//! parsed into `serde_json::Value` first so one walker handles both.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::domain::{CapabilityValue, SourceFormat};
use crate::error::{OrchestratorError, OrchestratorResult};

/// Parse a document in the given format.
pub(crate) fn parse_document(
    text: &str,
    format: SourceFormat,
    path: &Path,
) -> OrchestratorResult<Value> {
    let parsed = match format {
        SourceFormat::Json => serde_json::from_str::<Value>(text).map_err(|e| e.to_string()),
        SourceFormat::Yaml => serde_yaml_ng::from_str::<Value>(text).map_err(|e| e.to_string()),
    };

    parsed.map_err(|reason| OrchestratorError::ConfigParse {
        path: path.to_path_buf(),
        reason,
    })
}

/// Flatten a parsed document. The root must be a mapping.
pub(crate) fn flatten_document(
    document: &Value,
    path: &Path,
) -> OrchestratorResult<BTreeMap<String, CapabilityValue>> {
    let Value::Object(root) = document else {
        return Err(OrchestratorError::ConfigParse {
            path: path.to_path_buf(),
            reason: format!(
                "expected a key/value mapping at the top level, found {}",
                value_kind(document)
            ),
        });
    };

    let mut entries = BTreeMap::new();
    for (key, value) in root {
        flatten_into(key.clone(), value, &mut entries)?;
    }
    Ok(entries)
}

fn flatten_into(
    key: String,
    value: &Value,
    entries: &mut BTreeMap<String, CapabilityValue>,
) -> OrchestratorResult<()> {
    match value {
        Value::Object(map) => {
            for (child, child_value) in map {
                flatten_into(format!("{key}.{child}"), child_value, entries)?;
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(format!("{key}[{index}]"), item, entries)?;
            }
        }
        Value::Null => {
            return Err(OrchestratorError::InvalidCapabilityType {
                key,
                reason: "null has no capability representation".to_string(),
            });
        }
        leaf => {
            let coerced = coerce_leaf(leaf);
            entries.insert(key, coerced);
        }
    }
    Ok(())
}

/// Typed scalars keep their type; strings go through the text coercion.
fn coerce_leaf(value: &Value) -> CapabilityValue {
    match value {
        Value::Bool(b) => CapabilityValue::Bool(*b),
        Value::Number(n) => {
            if let Some(int) = n.as_i64() {
                CapabilityValue::Int(int)
            } else if n.is_u64() {
                // Larger than i64::MAX: no integer variant can hold it
                CapabilityValue::String(n.to_string())
            } else {
                n.as_f64().map_or_else(
                    || CapabilityValue::String(n.to_string()),
                    CapabilityValue::Float,
                )
            }
        }
        Value::String(s) => CapabilityValue::coerce(s),
        other => CapabilityValue::String(other.to_string()),
    }
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "nothing",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
