//! Layered configuration resolution
//!
//! Turns a settings layer and a secrets layer into a [`ResolvedConfig`]:
//! - `tokens` come only from the secrets layer, matched by field name; whatever
//!   the settings file holds under `[tokens]` is ignored.
//! - every other section comes only from the settings layer.
//! - textual values are coerced to the declared type; unknown keys are ignored.
//!
//! The first violation encountered aborts resolution.

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::{ConfigError, Section};
use super::layers::{RawValue, SecretsLayer, SettingsLayer};
use crate::domain::{
    FilesystemConfig, ResolvedConfig, ResourcesConfig, Secret, TokensConfig, WebConfig,
};

/// Secret values that mean "not filled in yet".
pub const PLACEHOLDER_SECRETS: &[&str] = &[".env", "your_hf_token_here", "your_civitai_token_here"];

/// Platform rule for volume names.
static VOLUME_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]{1,63}$").unwrap());

/// Resolve a settings/secrets pair. Pure: no I/O, no environment lookups.
pub fn resolve(
    settings: &SettingsLayer,
    secrets: &SecretsLayer,
) -> Result<ResolvedConfig, ConfigError> {
    let tokens = TokensConfig {
        hf_token: secret(secrets, "hf_token")?,
        civitai_api_token: secret(secrets, "civitai_api_token")?,
    };

    let web = SectionReader::new(settings, Section::Web);
    let web = WebConfig {
        host: web.required_text("host")?,
        port: web.required_integer("port", 1, i64::from(u16::MAX))?,
    };

    let fs = SectionReader::new(settings, Section::Filesystem);
    let filesystem = FilesystemConfig {
        volume_name: volume_name(&fs)?,
        volume_mount_location: fs.required_text("volume_mount_location")?,
        comfyui_dir: fs.required_text("comfyui_dir")?,
        custom_nodes_dir: fs.required_text("custom_nodes_dir")?,
        custom_output_dir: fs.required_text("custom_output_dir")?,
    };

    let res = SectionReader::new(settings, Section::Resources);
    let resources = ResourcesConfig {
        gpu_type: res.optional_text("gpu_type")?,
        cpu: res.optional_float("cpu", 0.0)?,
        memory: res.optional_integer("memory", 0, i64::from(u32::MAX))?,
        max_containers: res.required_integer("max_containers", 1, i64::from(u32::MAX))?,
        scaledown_window: res.required_integer("scaledown_window", 0, i64::MAX)?,
        timeout: res.required_integer("timeout", 1, i64::MAX)?,
        max_inputs: res.required_integer("max_inputs", 1, i64::from(u32::MAX))?,
    };

    Ok(ResolvedConfig { tokens, web, filesystem, resources })
}

fn secret(secrets: &SecretsLayer, key: &'static str) -> Result<Secret, ConfigError> {
    match secrets.get(key).map(str::trim) {
        Some(value) if !is_placeholder(value) => Ok(Secret::new(value)),
        _ => Err(ConfigError::Missing { section: Section::Tokens, key }),
    }
}

fn is_placeholder(value: &str) -> bool {
    value.is_empty() || PLACEHOLDER_SECRETS.iter().any(|p| value.eq_ignore_ascii_case(p))
}

fn volume_name(fs: &SectionReader<'_>) -> Result<String, ConfigError> {
    let name = fs.required_text("volume_name")?;
    if !VOLUME_NAME.is_match(&name) {
        return Err(fs.range(
            "volume_name",
            format!(
                "{name:?} must be shorter than 64 characters and use only letters, digits, '-', '_' or '.'"
            ),
        ));
    }
    Ok(name)
}

/// Typed accessors over one section of the settings layer.
struct SectionReader<'a> {
    layer: &'a SettingsLayer,
    section: Section,
}

impl<'a> SectionReader<'a> {
    fn new(layer: &'a SettingsLayer, section: Section) -> Self {
        Self { layer, section }
    }

    /// The value for `key`, or `None` when absent or null.
    fn raw(&self, key: &str) -> Option<&'a RawValue> {
        self.layer.get(self.section.as_str(), key).filter(|v| !matches!(v, RawValue::Null))
    }

    fn missing(&self, key: &'static str) -> ConfigError {
        ConfigError::Missing { section: self.section, key }
    }

    fn type_error(&self, key: &'static str, expected: &'static str, raw: &RawValue) -> ConfigError {
        ConfigError::Type { section: self.section, key, expected, raw: raw.describe() }
    }

    fn range(&self, key: &'static str, reason: String) -> ConfigError {
        ConfigError::Range { section: self.section, key, reason }
    }

    fn required_text(&self, key: &'static str) -> Result<String, ConfigError> {
        self.optional_text(key)?.ok_or_else(|| self.missing(key))
    }

    /// Scalars are stringified; a blank string counts as absent.
    fn optional_text(&self, key: &'static str) -> Result<Option<String>, ConfigError> {
        let Some(raw) = self.raw(key) else {
            return Ok(None);
        };
        let text = match raw {
            RawValue::Text(s) => s.trim().to_string(),
            RawValue::Integer(_) | RawValue::Float(_) => raw.describe(),
            RawValue::Null | RawValue::Boolean(_) | RawValue::Composite(_) => {
                return Err(self.type_error(key, "a string", raw));
            }
        };
        Ok(if text.is_empty() { None } else { Some(text) })
    }

    fn required_integer<T: TryFrom<i64>>(
        &self,
        key: &'static str,
        min: i64,
        max: i64,
    ) -> Result<T, ConfigError> {
        self.optional_integer(key, min, max)?.ok_or_else(|| self.missing(key))
    }

    fn optional_integer<T: TryFrom<i64>>(
        &self,
        key: &'static str,
        min: i64,
        max: i64,
    ) -> Result<Option<T>, ConfigError> {
        let Some(raw) = self.raw(key) else {
            return Ok(None);
        };
        if is_blank(raw) {
            return Ok(None);
        }
        let value = coerce_integer(raw).ok_or_else(|| self.type_error(key, "an integer", raw))?;
        if value < min || value > max {
            return Err(self.range(key, bounds_reason(value, min, max)));
        }
        T::try_from(value)
            .map(Some)
            .map_err(|_| self.range(key, bounds_reason(value, min, max)))
    }

    fn optional_float(&self, key: &'static str, min: f64) -> Result<Option<f64>, ConfigError> {
        let Some(raw) = self.raw(key) else {
            return Ok(None);
        };
        if is_blank(raw) {
            return Ok(None);
        }
        let value = coerce_float(raw).ok_or_else(|| self.type_error(key, "a number", raw))?;
        if !value.is_finite() || value < min {
            return Err(self.range(key, format!("must be a finite number >= {min}, got {value}")));
        }
        Ok(Some(value))
    }
}

fn is_blank(raw: &RawValue) -> bool {
    matches!(raw, RawValue::Text(s) if s.trim().is_empty())
}

fn coerce_integer(raw: &RawValue) -> Option<i64> {
    match raw {
        RawValue::Integer(i) => Some(*i),
        RawValue::Text(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().and_then(whole))
        }
        RawValue::Float(f) => whole(*f),
        _ => None,
    }
}

/// `f` as an integer when it has no fractional part and fits exactly.
fn whole(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f.abs() < 9.0e15).then_some(f as i64)
}

fn coerce_float(raw: &RawValue) -> Option<f64> {
    match raw {
        RawValue::Integer(i) => Some(*i as f64),
        RawValue::Float(f) => Some(*f),
        RawValue::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn bounds_reason(value: i64, min: i64, max: i64) -> String {
    if max == i64::MAX {
        format!("must be at least {min}, got {value}")
    } else {
        format!("must be between {min} and {max}, got {value}")
    }
}
