//! Hosted service declaration

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::ResolvedConfig;
use crate::hooks::launch_args;

pub const APP_NAME: &str = "comfyui-app";

/// Seconds the platform waits for the UI port to open.
pub const STARTUP_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerOptions {
    pub max_containers: u32,
    pub scaledown_window: u64,
    pub timeout: u64,
    /// `None` runs on CPU only.
    pub gpu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<u32>,
    /// Mount point → volume name. Volumes are created on first use.
    pub volumes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebServer {
    pub port: u16,
    pub startup_timeout: u64,
    pub command: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceSpec {
    pub app_name: &'static str,
    pub container: ContainerOptions,
    /// Concurrent inputs a single container accepts.
    pub max_inputs: u32,
    pub web_server: WebServer,
}

pub fn build_service(config: &ResolvedConfig) -> ServiceSpec {
    let res = &config.resources;
    let volumes = BTreeMap::from([(
        config.filesystem.volume_mount_location.clone(),
        config.filesystem.volume_name.clone(),
    )]);

    let mut command = vec!["comfy".to_string()];
    command.extend(launch_args(config));

    ServiceSpec {
        app_name: APP_NAME,
        container: ContainerOptions {
            max_containers: res.max_containers,
            scaledown_window: res.scaledown_window,
            timeout: res.timeout,
            gpu: res.gpu_type.clone(),
            cpu: res.cpu,
            memory: res.memory,
            volumes,
        },
        max_inputs: res.max_inputs,
        web_server: WebServer {
            port: config.web.port,
            startup_timeout: STARTUP_TIMEOUT_SECS,
            command,
        },
    }
}
