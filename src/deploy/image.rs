//! Container image specification

use serde::Serialize;

use crate::domain::{ResolvedConfig, Secret};

pub const PYTHON_VERSION: &str = "3.11";

const APT_PACKAGES: &[&str] = &[
    "git",
    "nano",
    // OpenCV runtime libraries
    "libgl1",
    "libglib2.0-0",
    "libsm6",
    "libxext6",
    "libxrender1",
];

const PIP_PACKAGES: &[&str] = &["comfy-cli", "gguf", "sentencepiece", "opencv-python-headless"];

const COMFY_INSTALL: &str = "comfy --skip-prompt install --nvidia";

/// Custom nodes baked into the image. Nodes on the volume are handled by the enter hook.
pub const BUNDLED_NODES: &[&str] = &[
    "ComfyUI-Crystools",
    "comfyui-easy-use",
    "comfyui-kjnodes",
    "comfyui_ultimatesdupscale",
    "comfyui_essentials",
    "comfyui-detail-daemon",
    "seedvarianceenhancer",
    "comfyui_controlnet_aux",
];

pub const EXTRA_MODEL_PATHS_FILE: &str = "extra_model_paths.yaml";
pub const MANAGER_CONFIG_FILE: &str = "config_comfyui.ini";
pub const UI_SETTINGS_FILE: &str = "comfy.settings.json";
pub const WORKFLOWS_DIR: &str = "workflows";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseImage {
    pub kind: &'static str,
    pub python_version: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvVar {
    pub name: &'static str,
    pub value: Secret,
}

/// A local file or directory copied into the image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalMount {
    pub local: String,
    pub remote: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSpec {
    pub base: BaseImage,
    pub env: Vec<EnvVar>,
    pub apt_packages: Vec<String>,
    pub pip_packages: Vec<String>,
    /// Build steps, in order.
    pub commands: Vec<String>,
    pub local_files: Vec<LocalMount>,
    pub local_dirs: Vec<LocalMount>,
}

/// Local names of the settings and secrets files that get shipped with the image.
#[derive(Debug, Clone, Copy)]
pub struct ShippedFiles<'a> {
    pub settings_file: &'a str,
    pub secrets_file: &'a str,
}

pub fn build_image(config: &ResolvedConfig, shipped: ShippedFiles<'_>) -> ImageSpec {
    let comfy = config.filesystem.comfyui_dir.trim_end_matches('/');

    let mut commands = vec![COMFY_INSTALL.to_string()];
    commands.extend(BUNDLED_NODES.iter().map(|node| format!("comfy node install {node}")));

    let local_files = vec![
        LocalMount {
            local: shipped.settings_file.to_string(),
            remote: format!("/root/{}", shipped.settings_file),
        },
        LocalMount { local: shipped.secrets_file.to_string(), remote: "/root/.env".to_string() },
        LocalMount {
            local: EXTRA_MODEL_PATHS_FILE.to_string(),
            remote: format!("{comfy}/{EXTRA_MODEL_PATHS_FILE}"),
        },
        LocalMount {
            local: MANAGER_CONFIG_FILE.to_string(),
            remote: format!("{comfy}/user/__manager/config.ini"),
        },
        LocalMount {
            local: UI_SETTINGS_FILE.to_string(),
            remote: format!("{comfy}/user/default/comfy.settings.json"),
        },
    ];

    ImageSpec {
        base: BaseImage { kind: "debian_slim", python_version: PYTHON_VERSION },
        env: vec![
            EnvVar { name: "HF_TOKEN", value: config.tokens.hf_token.clone() },
            EnvVar { name: "CIVITAI_API_TOKEN", value: config.tokens.civitai_api_token.clone() },
        ],
        apt_packages: APT_PACKAGES.iter().map(|p| p.to_string()).collect(),
        pip_packages: PIP_PACKAGES.iter().map(|p| p.to_string()).collect(),
        commands,
        local_files,
        local_dirs: vec![LocalMount {
            local: format!("{WORKFLOWS_DIR}/"),
            remote: format!("{comfy}/user/default/workflows/"),
        }],
    }
}
