//! Settings and secrets file loading

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::layers::{SecretsLayer, SettingsLayer};
use super::resolve::resolve;
use crate::domain::ResolvedConfig;

/// Settings file names tried, in order, when none is given explicitly.
pub const SETTINGS_CANDIDATES: &[&str] =
    &["config.toml", "config.yaml", "config.yml", "config.ini"];

pub const DEFAULT_SECRETS_FILE: &str = ".env";

/// Where the two input layers live.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub project_dir: PathBuf,
    pub settings: Option<PathBuf>,
    pub secrets: Option<PathBuf>,
}

impl ConfigPaths {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self { project_dir: project_dir.into(), settings: None, secrets: None }
    }

    /// Explicit secrets path, or `.env` in the project directory.
    pub fn secrets_path(&self) -> PathBuf {
        self.secrets.clone().unwrap_or_else(|| self.project_dir.join(DEFAULT_SECRETS_FILE))
    }

    /// Explicit settings path, or the first discovered candidate.
    pub fn settings_path(&self) -> Option<PathBuf> {
        match &self.settings {
            Some(path) => Some(path.clone()),
            None => discover_settings(&self.project_dir),
        }
    }
}

/// A resolved configuration together with the files it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub settings_path: PathBuf,
    pub secrets_path: PathBuf,
    pub config: ResolvedConfig,
}

/// Read both layers and resolve them.
pub fn load_config(paths: &ConfigPaths) -> Result<LoadedConfig> {
    let settings_path = paths.settings_path().with_context(|| {
        format!(
            "No settings file found in {} (looked for {})",
            paths.project_dir.display(),
            SETTINGS_CANDIDATES.join(", ")
        )
    })?;
    let secrets_path = paths.secrets_path();

    let settings = load_settings(&settings_path)?;
    let secrets = load_secrets(&secrets_path)?;

    let config = resolve(&settings, &secrets).with_context(|| {
        format!(
            "Invalid configuration (settings: {}, secrets: {})",
            settings_path.display(),
            secrets_path.display()
        )
    })?;

    tracing::debug!(
        "Resolved configuration from {} and {} ({} secret entries)",
        settings_path.display(),
        secrets_path.display(),
        secrets.len()
    );

    Ok(LoadedConfig { settings_path, secrets_path, config })
}

pub fn discover_settings(project_dir: &Path) -> Option<PathBuf> {
    SETTINGS_CANDIDATES.iter().map(|name| project_dir.join(name)).find(|path| path.is_file())
}

pub fn load_settings(path: &Path) -> Result<SettingsLayer> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed reading settings file: {}", path.display()))?;
    parse_settings(&content, path)
}

/// Parse settings content, choosing the format from the file extension.
pub fn parse_settings(content: &str, path: &Path) -> Result<SettingsLayer> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "toml" => {
            let raw: toml::Value = toml::from_str(content)
                .with_context(|| format!("Invalid TOML syntax: {}", path.display()))?;
            SettingsLayer::from_toml(raw)
                .with_context(|| format!("Invalid settings file: {}", path.display()))
        }
        "yaml" | "yml" => {
            let raw: serde_yaml::Value = serde_yaml::from_str(content)
                .with_context(|| format!("Invalid YAML syntax: {}", path.display()))?;
            SettingsLayer::from_yaml(raw)
                .with_context(|| format!("Invalid settings file: {}", path.display()))
        }
        "ini" => {
            let raw = configparser::ini::Ini::new()
                .read(content.to_string())
                .map_err(|e| anyhow::anyhow!(e))
                .with_context(|| format!("Invalid INI syntax: {}", path.display()))?;
            Ok(SettingsLayer::from_ini(raw))
        }
        other => anyhow::bail!(
            "Unsupported settings extension '.{}' for file {}",
            other,
            path.display()
        ),
    }
}

pub fn load_secrets(path: &Path) -> Result<SecretsLayer> {
    if !path.exists() {
        anyhow::bail!(
            "Secrets file not found: {} (run `comfy-modal setup` or create it with HF_TOKEN and CIVITAI_API_TOKEN)",
            path.display()
        );
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed reading secrets file: {}", path.display()))?;
    parse_secrets(&content).with_context(|| format!("Invalid secrets file: {}", path.display()))
}

/// Parse dotenv-formatted content without touching the process environment.
pub fn parse_secrets(content: &str) -> Result<SecretsLayer> {
    let mut layer = SecretsLayer::new();
    for item in dotenvy::from_read_iter(content.as_bytes()) {
        let (name, value) = item?;
        layer.insert(&name, value);
    }
    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SETTINGS_TOML: &str = r#"
[tokens]
hf_token = ".env"
civitai_api_token = ".env"

[web]
host = "0.0.0.0"
port = 8188

[filesystem]
volume_name = "my-comfy-models"
volume_mount_location = "/root/per_comfy-storage"
comfyui_dir = "/root/comfy/ComfyUI"
custom_nodes_dir = "/root/comfy/ComfyUI/custom_nodes"
custom_output_dir = "/root/per_comfy-storage/output"

[resources]
gpu_type = "L40S"
max_containers = 1
scaledown_window = 300
timeout = 3600
max_inputs = 10
"#;

    const SECRETS: &str = "HF_TOKEN=\"hf_from_file\"\nCIVITAI_API_TOKEN=civ_from_file\n";

    fn project() -> TempDir {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("config.toml"), SETTINGS_TOML).expect("write");
        fs::write(tmp.path().join(".env"), SECRETS).expect("write");
        tmp
    }

    #[test]
    fn loads_discovered_files() {
        let tmp = project();
        let loaded = load_config(&ConfigPaths::new(tmp.path())).expect("load");

        assert_eq!(loaded.settings_path, tmp.path().join("config.toml"));
        assert_eq!(loaded.secrets_path, tmp.path().join(".env"));
        assert_eq!(loaded.config.tokens.hf_token.expose(), "hf_from_file");
        assert_eq!(loaded.config.tokens.civitai_api_token.expose(), "civ_from_file");
        assert_eq!(loaded.config.web.port, 8188);
        assert_eq!(loaded.config.resources.cpu, None);
    }

    #[test]
    fn yaml_settings_resolve_the_same() {
        let tmp = project();
        let yaml = r#"
web:
  host: 0.0.0.0
  port: "8188"
filesystem:
  volume_name: my-comfy-models
  volume_mount_location: /root/per_comfy-storage
  comfyui_dir: /root/comfy/ComfyUI
  custom_nodes_dir: /root/comfy/ComfyUI/custom_nodes
  custom_output_dir: /root/per_comfy-storage/output
resources:
  gpu_type: L40S
  cpu: ~
  max_containers: 1
  scaledown_window: 300
  timeout: 3600
  max_inputs: 10
"#;
        let path = tmp.path().join("deploy.yaml");
        fs::write(&path, yaml).expect("write");

        let from_toml = load_config(&ConfigPaths::new(tmp.path())).expect("toml");
        let mut paths = ConfigPaths::new(tmp.path());
        paths.settings = Some(path);
        let from_yaml = load_config(&paths).expect("yaml");

        assert_eq!(from_toml.config, from_yaml.config);
    }

    #[test]
    fn ini_settings_resolve_the_same() {
        let tmp = project();
        let from_toml = load_config(&ConfigPaths::new(tmp.path())).expect("toml");

        let ini = "; deployment settings
[tokens]
hf_token = .env
civitai_api_token = .env

[web]
host = 0.0.0.0
port = 8188

[filesystem]
volume_name = my-comfy-models
volume_mount_location = /root/per_comfy-storage
comfyui_dir = /root/comfy/ComfyUI
custom_nodes_dir = /root/comfy/ComfyUI/custom_nodes
custom_output_dir = /root/per_comfy-storage/output

[resources]
gpu_type = L40S
cpu =
max_containers = 1
scaledown_window = 300
timeout = 3600
max_inputs = 10
";
        fs::remove_file(tmp.path().join("config.toml")).expect("remove");
        fs::write(tmp.path().join("config.ini"), ini).expect("write");

        let from_ini = load_config(&ConfigPaths::new(tmp.path())).expect("ini");
        assert_eq!(from_ini.settings_path, tmp.path().join("config.ini"));
        assert_eq!(from_toml.config, from_ini.config);
    }

    #[test]
    fn toml_is_preferred_over_ini() {
        let tmp = project();
        fs::write(tmp.path().join("config.ini"), "[web]\nport = 1\n").expect("write");
        assert_eq!(discover_settings(tmp.path()), Some(tmp.path().join("config.toml")));
    }

    #[test]
    fn missing_settings_file_is_an_error() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join(".env"), SECRETS).expect("write");
        let err = load_config(&ConfigPaths::new(tmp.path())).expect_err("should fail");
        assert!(err.to_string().contains("No settings file found"));
    }

    #[test]
    fn missing_secrets_file_points_to_setup() {
        let tmp = project();
        fs::remove_file(tmp.path().join(".env")).expect("remove");
        let err = load_config(&ConfigPaths::new(tmp.path())).expect_err("should fail");
        assert!(err.to_string().contains("comfy-modal setup"));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = parse_settings("{}", Path::new("config.json")).expect_err("should fail");
        assert!(err.to_string().contains("Unsupported settings extension '.json'"));
    }

    #[test]
    fn invalid_toml_reports_the_file() {
        let err = parse_settings("[web\n", Path::new("config.toml")).expect_err("should fail");
        assert!(err.to_string().contains("Invalid TOML syntax"));
    }

    #[test]
    fn resolution_errors_keep_the_structured_cause() {
        let tmp = project();
        fs::write(tmp.path().join(".env"), "HF_TOKEN=your_hf_token_here\n").expect("write");
        let err = load_config(&ConfigPaths::new(tmp.path())).expect_err("should fail");
        let cause = err.downcast_ref::<crate::config::ConfigError>().expect("config error");
        assert_eq!(cause.key(), "hf_token");
    }

    #[test]
    fn secrets_parse_comments_and_quotes() {
        let layer = parse_secrets("# tokens\nHF_TOKEN='abc'\n\nCIVITAI_API_TOKEN=\"def\"\n")
            .expect("parse");
        assert_eq!(layer.get("hf_token"), Some("abc"));
        assert_eq!(layer.get("civitai_api_token"), Some("def"));

        let spaced = parse_secrets("HF_TOKEN = \"hf_abc\"\nCIVITAI_API_TOKEN = \"civ\"\n")
            .expect("parse spaced");
        assert_eq!(spaced.get("hf_token"), Some("hf_abc"));
        assert_eq!(spaced.get("civitai_api_token"), Some("civ"));
    }
}
