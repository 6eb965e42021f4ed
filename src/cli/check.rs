//! Check command implementation

use anyhow::Result;
use clap::Args;

use crate::config::{load_config, ConfigPaths};
use crate::domain::ResolvedConfig;

#[derive(Args)]
pub struct CheckArgs {
    /// Print the resolved configuration as JSON (tokens masked)
    #[arg(long)]
    pub json: bool,
}

pub fn run(paths: &ConfigPaths, args: CheckArgs) -> Result<()> {
    let loaded = load_config(paths)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&loaded.config)?);
        return Ok(());
    }

    println!("Configuration loaded");
    println!("  Settings: {}", loaded.settings_path.display());
    println!("  Secrets:  {}", loaded.secrets_path.display());
    print!("{}", describe(&loaded.config));
    Ok(())
}

fn describe(config: &ResolvedConfig) -> String {
    let or_default = |value: Option<String>| value.unwrap_or_else(|| "(platform default)".to_string());
    let res = &config.resources;

    let rows: Vec<(&str, Vec<(&str, String)>)> = vec![
        (
            "tokens",
            vec![
                ("hf_token", config.tokens.hf_token.hint()),
                ("civitai_api_token", config.tokens.civitai_api_token.hint()),
            ],
        ),
        (
            "web",
            vec![("host", config.web.host.clone()), ("port", config.web.port.to_string())],
        ),
        (
            "filesystem",
            vec![
                ("volume_name", config.filesystem.volume_name.clone()),
                ("volume_mount_location", config.filesystem.volume_mount_location.clone()),
                ("comfyui_dir", config.filesystem.comfyui_dir.clone()),
                ("custom_nodes_dir", config.filesystem.custom_nodes_dir.clone()),
                ("custom_output_dir", config.filesystem.custom_output_dir.clone()),
            ],
        ),
        (
            "resources",
            vec![
                ("gpu_type", or_default(res.gpu_type.clone())),
                ("cpu", or_default(res.cpu.map(|c| c.to_string()))),
                ("memory", or_default(res.memory.map(|m| format!("{m} MiB")))),
                ("max_containers", res.max_containers.to_string()),
                ("scaledown_window", format!("{}s", res.scaledown_window)),
                ("timeout", format!("{}s", res.timeout)),
                ("max_inputs", res.max_inputs.to_string()),
            ],
        ),
    ];

    let mut out = String::new();
    for (section, fields) in rows {
        out.push_str(&format!("[{section}]\n"));
        for (key, value) in fields {
            out.push_str(&format!("  {key:<22} {value}\n"));
        }
    }
    out
}
