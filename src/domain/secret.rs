//! Credential wrapper that never prints its value

use serde::{Serialize, Serializer};
use std::fmt;

/// Placeholder shown wherever a secret would otherwise be rendered.
pub const MASK: &str = "********";

/// Public prefix every Hugging Face access token starts with.
const HF_PREFIX: &str = "hf_";

/// A credential taken from the secrets layer.
///
/// `Debug`, `Display` and `Serialize` all emit [`MASK`]. The cleartext is only
/// reachable through [`Secret::expose`].
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Short hint safe for terminal output: the mask and the length. Only the
    /// well-known `hf_` prefix is ever shown.
    pub fn hint(&self) -> String {
        let len = self.0.chars().count();
        if len <= 8 {
            return MASK.to_string();
        }
        let prefix = if self.0.starts_with(HF_PREFIX) { HF_PREFIX } else { "" };
        format!("{prefix}{MASK} ({len} chars)")
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(MASK)
    }
}
