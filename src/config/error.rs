//! Resolution error taxonomy

use std::fmt;
use thiserror::Error;

/// Top-level sections of the settings document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Tokens,
    Web,
    Filesystem,
    Resources,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Tokens => "tokens",
            Section::Web => "web",
            Section::Filesystem => "filesystem",
            Section::Resources => "resources",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a settings/secrets pair could not be turned into a `ResolvedConfig`.
///
/// Resolution stops at the first violation; sections are checked in the order
/// tokens, web, filesystem, resources and keys in declaration order.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("missing required value `{section}.{key}`")]
    Missing { section: Section, key: &'static str },

    #[error("`{section}.{key}` must be {expected}, got {raw:?}")]
    Type { section: Section, key: &'static str, expected: &'static str, raw: String },

    #[error("`{section}.{key}` is out of range: {reason}")]
    Range { section: Section, key: &'static str, reason: String },
}

impl ConfigError {
    pub fn section(&self) -> Section {
        match self {
            ConfigError::Missing { section, .. }
            | ConfigError::Type { section, .. }
            | ConfigError::Range { section, .. } => *section,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ConfigError::Missing { key, .. }
            | ConfigError::Type { key, .. }
            | ConfigError::Range { key, .. } => key,
        }
    }
}
