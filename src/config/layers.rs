//! In-memory settings and secrets layers
//!
//! Every file format the loader accepts are flattened into the same
//! section → key → scalar shape before resolution, so the resolver never sees
//! TOML or YAML types.

use anyhow::Result;
use std::collections::{BTreeMap, HashMap};

/// A single scalar as it appeared in the settings document.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// YAML `null` / `~`. Treated the same as an absent key.
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// An array or table where a scalar was expected. Carries the kind for diagnostics.
    Composite(&'static str),
}

impl RawValue {
    /// Textual form used in type-error diagnostics.
    pub fn describe(&self) -> String {
        match self {
            RawValue::Null => "null".to_string(),
            RawValue::Text(s) => s.clone(),
            RawValue::Integer(i) => i.to_string(),
            RawValue::Float(f) => f.to_string(),
            RawValue::Boolean(b) => b.to_string(),
            RawValue::Composite(kind) => format!("<{kind}>"),
        }
    }

    fn from_toml(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => RawValue::Text(s),
            toml::Value::Integer(i) => RawValue::Integer(i),
            toml::Value::Float(f) => RawValue::Float(f),
            toml::Value::Boolean(b) => RawValue::Boolean(b),
            toml::Value::Datetime(dt) => RawValue::Text(dt.to_string()),
            toml::Value::Array(_) => RawValue::Composite("array"),
            toml::Value::Table(_) => RawValue::Composite("table"),
        }
    }

    fn from_yaml(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => RawValue::Null,
            serde_yaml::Value::Bool(b) => RawValue::Boolean(b),
            serde_yaml::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => RawValue::Integer(i),
                (None, Some(f)) => RawValue::Float(f),
                (None, None) => RawValue::Text(n.to_string()),
            },
            serde_yaml::Value::String(s) => RawValue::Text(s),
            serde_yaml::Value::Sequence(_) => RawValue::Composite("sequence"),
            serde_yaml::Value::Mapping(_) => RawValue::Composite("mapping"),
            serde_yaml::Value::Tagged(_) => RawValue::Composite("tagged value"),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Integer(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Float(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Boolean(value)
    }
}

/// Static, non-secret settings organised into named sections.
///
/// Section and key names are lowercased on insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsLayer {
    sections: BTreeMap<String, BTreeMap<String, RawValue>>,
}

impl SettingsLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, section: &str, key: &str, value: impl Into<RawValue>) {
        self.sections
            .entry(section.to_ascii_lowercase())
            .or_default()
            .insert(key.to_ascii_lowercase(), value.into());
    }

    /// Builder form of [`SettingsLayer::insert`].
    pub fn with(mut self, section: &str, key: &str, value: impl Into<RawValue>) -> Self {
        self.insert(section, key, value);
        self
    }

    pub fn remove(&mut self, section: &str, key: &str) -> Option<RawValue> {
        self.sections
            .get_mut(&section.to_ascii_lowercase())
            .and_then(|entries| entries.remove(&key.to_ascii_lowercase()))
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&RawValue> {
        self.sections.get(section).and_then(|entries| entries.get(key))
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Flatten a parsed TOML document. Top-level scalars are ignored.
    pub fn from_toml(document: toml::Value) -> Result<Self> {
        let toml::Value::Table(table) = document else {
            anyhow::bail!("Settings document must be a table of sections");
        };

        let mut layer = Self::new();
        for (section, body) in table {
            match body {
                toml::Value::Table(entries) => {
                    // An empty [section] still counts as present.
                    layer.sections.entry(section.to_ascii_lowercase()).or_default();
                    for (key, value) in entries {
                        layer.insert(&section, &key, RawValue::from_toml(value));
                    }
                }
                _ => tracing::debug!("Ignoring top-level settings key '{}'", section),
            }
        }
        Ok(layer)
    }

    /// Flatten a parsed YAML document. Top-level scalars and non-string keys are ignored.
    pub fn from_yaml(document: serde_yaml::Value) -> Result<Self> {
        let mapping = match document {
            serde_yaml::Value::Mapping(mapping) => mapping,
            serde_yaml::Value::Null => return Ok(Self::new()),
            _ => anyhow::bail!("Settings document must be a mapping of sections"),
        };

        let mut layer = Self::new();
        for (section, body) in mapping {
            let Some(section) = section.as_str().map(str::to_string) else {
                tracing::debug!("Ignoring non-string settings section name");
                continue;
            };
            match body {
                serde_yaml::Value::Mapping(entries) => {
                    layer.sections.entry(section.to_ascii_lowercase()).or_default();
                    for (key, value) in entries {
                        match key.as_str() {
                            Some(key) => layer.insert(&section, key, RawValue::from_yaml(value)),
                            None => tracing::debug!(
                                "Ignoring non-string key in settings section '{}'",
                                section
                            ),
                        }
                    }
                }
                serde_yaml::Value::Null => {
                    layer.sections.entry(section.to_ascii_lowercase()).or_default();
                }
                _ => tracing::debug!("Ignoring top-level settings key '{}'", section),
            }
        }
        Ok(layer)
    }

    /// Flatten a parsed INI document. Every value is text; a bare key counts as null.
    pub fn from_ini(document: HashMap<String, HashMap<String, Option<String>>>) -> Self {
        let mut layer = Self::new();
        for (section, entries) in document {
            layer.sections.entry(section.to_ascii_lowercase()).or_default();
            for (key, value) in entries {
                let value = value.map(RawValue::Text).unwrap_or(RawValue::Null);
                layer.insert(&section, &key, value);
            }
        }
        layer
    }
}

/// Flat secret name → value mapping. Lookups ignore ASCII case.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretsLayer {
    entries: BTreeMap<String, String>,
}

impl SecretsLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.entries.insert(name.to_ascii_uppercase(), value.into());
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&name.to_ascii_uppercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for SecretsLayer {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut layer = Self::new();
        for (name, value) in iter {
            layer.insert(name.as_ref(), value);
        }
        layer
    }
}

// Values stay out of debug output.
impl std::fmt::Debug for SecretsLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsLayer")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
