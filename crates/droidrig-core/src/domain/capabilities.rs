//! Typed capability sets handed to the driver-session layer.
//!
//! Configuration documents are flattened into `key -> CapabilityValue`
//! pairs. The value type is a closed union; [`CapabilityValue::coerce`] is
//! the single place where text becomes a typed value.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A single capability value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilityValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl CapabilityValue {
    /// Coerce a textual literal into the narrowest matching variant.
    ///
    /// `true`/`false` become `Bool`, integral numerals that fit in `i64`
    /// become `Int`, numerals containing a decimal point become `Float`,
    /// and everything else stays a `String`. Re-coercing the `Display`
    /// form of any coerced value yields the same value.
    pub fn coerce(raw: &str) -> Self {
        match raw {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }

        if let Ok(int) = raw.parse::<i64>() {
            return Self::Int(int);
        }

        if raw.contains('.') {
            if let Ok(float) = raw.parse::<f64>() {
                if float.is_finite() {
                    return Self::Float(float);
                }
            }
        }

        Self::String(raw.to_string())
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CapabilityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => f.write_str(&format_float(*x)),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// Render a float so that it always carries a decimal point.
///
/// `{:?}` already prints `12.0` for whole numbers, but exponent forms such
/// as `1e20` need the point re-inserted to survive another `coerce`.
fn format_float(value: f64) -> String {
    let rendered = format!("{value:?}");
    if rendered.contains('.') {
        rendered
    } else if let Some((mantissa, exponent)) = rendered.split_once('e') {
        format!("{mantissa}.0e{exponent}")
    } else {
        format!("{rendered}.0")
    }
}

/// File format a capability set was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Primary format (`.json`).
    Json,
    /// Secondary format (`.yaml`).
    Yaml,
}

impl SourceFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Diagnostics describing where a capability set came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub source_format: SourceFormat,
    pub source_path: PathBuf,
    /// Keys whose values were replaced or inserted by environment overrides.
    pub overridden_keys: Vec<String>,
}

/// Flattened capabilities plus their provenance.
///
/// Keys are kept sorted so that printing and serialization are stable.
/// A set is assembled once per resolution and then handed out by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilitySet {
    entries: BTreeMap<String, CapabilityValue>,
    provenance: Provenance,
}

impl CapabilitySet {
    pub fn new(
        entries: BTreeMap<String, CapabilityValue>,
        source_format: SourceFormat,
        source_path: impl AsRef<Path>,
    ) -> Self {
        Self {
            entries,
            provenance: Provenance {
                source_format,
                source_path: source_path.as_ref().to_path_buf(),
                overridden_keys: Vec::new(),
            },
        }
    }

    /// Replace (or insert) a value, recording the key as overridden.
    ///
    /// Only the resolver calls this, before the set is returned.
    pub(crate) fn apply_override(&mut self, key: &str, value: CapabilityValue) {
        self.entries.insert(key.to_string(), value);
        if !self.provenance.overridden_keys.iter().any(|k| k == key) {
            self.provenance.overridden_keys.push(key.to_string());
        }
    }

    pub fn get(&self, key: &str) -> Option<&CapabilityValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CapabilityValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Capabilities as a JSON object suitable for a session-creation body.
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .entries
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    CapabilityValue::Bool(b) => serde_json::Value::Bool(*b),
                    CapabilityValue::Int(i) => serde_json::Value::from(*i),
                    CapabilityValue::Float(x) => serde_json::Value::from(*x),
                    CapabilityValue::String(s) => serde_json::Value::String(s.clone()),
                };
                (k.clone(), value)
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.entries {
            writeln!(f, "{key} = {value}")?;
        }
        Ok(())
    }
}
