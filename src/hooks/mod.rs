//! Container lifecycle hooks
//!
//! `enter` runs once when a container starts and installs the Python
//! requirements of every custom node found on the volume. `launch` starts the
//! ComfyUI server the platform exposes.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::ResolvedConfig;
use crate::process::CommandRunner;

const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Outcome of the enter hook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeInstallReport {
    pub nodes_scanned: usize,
    pub installed: Vec<String>,
    pub failed: Vec<String>,
}

/// Install `requirements.txt` for every immediate sub-directory of `nodes_dir`.
///
/// A missing directory is not an error. Failed installs are recorded and the
/// scan continues.
pub fn install_node_requirements(
    nodes_dir: &Path,
    runner: &dyn CommandRunner,
) -> Result<NodeInstallReport> {
    let mut report = NodeInstallReport::default();

    if !nodes_dir.exists() {
        tracing::info!(
            "No custom_nodes directory at {}; skipping dependency check",
            nodes_dir.display()
        );
        return Ok(report);
    }

    let mut node_dirs: Vec<PathBuf> = fs::read_dir(nodes_dir)
        .with_context(|| format!("Failed listing custom nodes in {}", nodes_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .collect();
    node_dirs.sort();

    tracing::info!("Checking {} custom node(s) for requirements", node_dirs.len());
    for node_dir in node_dirs {
        report.nodes_scanned += 1;
        let requirements = node_dir.join(REQUIREMENTS_FILE);
        if !requirements.is_file() {
            continue;
        }

        let name = node_dir.file_name().and_then(|n| n.to_str()).unwrap_or("").to_string();
        let requirements = requirements.to_string_lossy().into_owned();
        tracing::info!("Installing requirements for {}", name);
        match runner.status("pip", &["install", "-r", requirements.as_str()]) {
            Ok(true) => report.installed.push(name),
            Ok(false) => {
                tracing::warn!("pip install failed for custom node {}", name);
                report.failed.push(name);
            }
            Err(err) => {
                tracing::warn!("Could not run pip for custom node {}: {}", name, err);
                report.failed.push(name);
            }
        }
    }
    tracing::info!(
        "Dependency check complete: {} installed, {} failed",
        report.installed.len(),
        report.failed.len()
    );

    Ok(report)
}

/// Arguments passed to `comfy` to start the web UI.
pub fn launch_args(config: &ResolvedConfig) -> Vec<String> {
    vec![
        "launch".to_string(),
        "--".to_string(),
        "--output-directory".to_string(),
        config.filesystem.custom_output_dir.clone(),
        "--listen".to_string(),
        config.web.host.clone(),
        "--port".to_string(),
        config.web.port.to_string(),
    ]
}

/// How the launch hook treats the server process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Start and return immediately.
    Detached,
    /// Block until the server exits.
    Foreground,
}

pub fn launch(config: &ResolvedConfig, runner: &dyn CommandRunner, mode: LaunchMode) -> Result<()> {
    let args = launch_args(config);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    tracing::info!("Starting ComfyUI on {}:{}", config.web.host, config.web.port);

    match mode {
        LaunchMode::Detached => {
            let pid = runner.spawn("comfy", &args).context("Failed to start `comfy launch`")?;
            tracing::info!("ComfyUI started (pid {})", pid);
        }
        LaunchMode::Foreground => {
            let ok = runner.status("comfy", &args).context("Failed to start `comfy launch`")?;
            if !ok {
                anyhow::bail!("ComfyUI exited with a non-zero status");
            }
        }
    }
    Ok(())
}
