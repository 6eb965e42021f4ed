//! `extra_model_paths.yaml` generation
//!
//! Points ComfyUI's model search at the folders on the persistent volume.

use anyhow::{Context, Result};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

use crate::domain::FilesystemConfig;

/// Model folders ComfyUI should search on the volume.
pub const MODEL_FOLDERS: &[&str] = &[
    "checkpoints",
    "text_encoders",
    "diffusion_models",
    "embeddings",
    "loras",
    "unet",
    "vae",
    "model_patches",
    "custom_nodes",
];

pub fn render_extra_model_paths(fs_config: &FilesystemConfig) -> Result<String> {
    let mut base_path = fs_config.volume_mount_location.clone();
    if !base_path.ends_with('/') {
        base_path.push('/');
    }

    let mut section = Mapping::new();
    section.insert("base_path".into(), base_path.into());
    section.insert("is_default".into(), true.into());
    for folder in MODEL_FOLDERS {
        section.insert((*folder).into(), format!("{folder}/").into());
    }

    let mut root = Mapping::new();
    root.insert("comfyui".into(), Value::Mapping(section));

    let body = serde_yaml::to_string(&root).context("Failed rendering extra_model_paths.yaml")?;
    Ok(format!("# Generated by comfy-modal. Paths are relative to base_path.\n{body}"))
}

/// Write the file unless it exists and `force` is off. Returns whether it was written.
pub fn write_extra_model_paths(path: &Path, fs_config: &FilesystemConfig, force: bool) -> Result<bool> {
    if path.exists() && !force {
        tracing::debug!("{} already exists; not regenerating", path.display());
        return Ok(false);
    }
    let content = render_extra_model_paths(fs_config)?;
    fs::write(path, content).with_context(|| format!("Failed writing {}", path.display()))?;
    Ok(true)
}
