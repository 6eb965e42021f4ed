//! Core domain types shared by the resolver, the deployment plan, the hooks
//! and the setup wizard.

pub mod secret;

use serde::Serialize;

pub use secret::Secret;

/// Fully validated configuration produced by [`crate::config::resolve`].
///
/// Built once at startup and handed out by reference; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    pub tokens: TokensConfig,
    pub web: WebConfig,
    pub filesystem: FilesystemConfig,
    pub resources: ResourcesConfig,
}

/// Credentials, sourced only from the secrets layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokensConfig {
    pub hf_token: Secret,
    pub civitai_api_token: Secret,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

/// Volume identity and the in-container directory layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilesystemConfig {
    pub volume_name: String,
    pub volume_mount_location: String,
    pub comfyui_dir: String,
    pub custom_nodes_dir: String,
    pub custom_output_dir: String,
}

/// Container sizing and autoscaling knobs.
///
/// `None` for `gpu_type`, `cpu` or `memory` lets the platform pick its default;
/// it is distinct from an explicit zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourcesConfig {
    pub gpu_type: Option<String>,
    pub cpu: Option<f64>,
    /// MiB
    pub memory: Option<u32>,
    pub max_containers: u32,
    /// Seconds an idle container is kept alive.
    pub scaledown_window: u64,
    /// Seconds
    pub timeout: u64,
    pub max_inputs: u32,
}

#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// A complete, valid configuration for unit tests.
    pub fn sample_config() -> ResolvedConfig {
        ResolvedConfig {
            tokens: TokensConfig {
                hf_token: Secret::new("hf_test_token_value_0123456789"),
                civitai_api_token: Secret::new("civitai_test_token_value"),
            },
            web: WebConfig { host: "0.0.0.0".to_string(), port: 8188 },
            filesystem: FilesystemConfig {
                volume_name: "my-comfy-models".to_string(),
                volume_mount_location: "/root/per_comfy-storage".to_string(),
                comfyui_dir: "/root/comfy/ComfyUI".to_string(),
                custom_nodes_dir: "/root/comfy/ComfyUI/custom_nodes".to_string(),
                custom_output_dir: "/root/per_comfy-storage/output".to_string(),
            },
            resources: ResourcesConfig {
                gpu_type: Some("L40S".to_string()),
                cpu: Some(4.0),
                memory: Some(16384),
                max_containers: 1,
                scaledown_window: 300,
                timeout: 3600,
                max_inputs: 10,
            },
        }
    }
}
