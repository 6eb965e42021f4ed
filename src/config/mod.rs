//! Configuration loading and resolution
//!
//! A settings file (TOML or YAML) and a dotenv secrets file are read into
//! layers, then resolved into one immutable [`crate::domain::ResolvedConfig`].
//! Only the `tokens` section is sourced from secrets.

pub mod error;
pub mod layers;
pub mod loader;
pub mod resolve;

pub use error::{ConfigError, Section};
pub use layers::{RawValue, SecretsLayer, SettingsLayer};
pub use loader::{load_config, ConfigPaths, LoadedConfig};
pub use resolve::resolve;
