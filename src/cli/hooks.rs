//! Container hook commands

use anyhow::Result;
use clap::Args;
use std::path::Path;

use crate::config::{load_config, ConfigPaths};
use crate::hooks::{install_node_requirements, launch, LaunchMode};
use crate::process::SystemRunner;

#[derive(Args)]
pub struct LaunchArgs {
    /// Start the server in the background and return immediately
    #[arg(long)]
    pub detach: bool,
}

pub fn run_enter(paths: &ConfigPaths) -> Result<()> {
    let loaded = load_config(paths)?;
    let nodes_dir = Path::new(&loaded.config.filesystem.custom_nodes_dir);

    println!("--- Checking for custom node requirements ---");
    let report = install_node_requirements(nodes_dir, &SystemRunner)?;
    for name in &report.failed {
        eprintln!("warning: requirements for '{name}' failed to install");
    }
    println!(
        "--- Dependency check complete ({} nodes, {} installed, {} failed) ---",
        report.nodes_scanned,
        report.installed.len(),
        report.failed.len()
    );
    Ok(())
}

pub fn run_launch(paths: &ConfigPaths, args: LaunchArgs) -> Result<()> {
    let loaded = load_config(paths)?;
    let mode = if args.detach { LaunchMode::Detached } else { LaunchMode::Foreground };
    println!("Starting ComfyUI on {}:{}...", loaded.config.web.host, loaded.config.web.port);
    launch(&loaded.config, &SystemRunner, mode)
}
