//! Plan and paths command implementations

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use crate::config::{load_config, ConfigPaths};
use crate::deploy::image::EXTRA_MODEL_PATHS_FILE;
use crate::deploy::{build_plan, render_plan, PlanFormat, ShippedFiles};
use crate::setup::model_paths::write_extra_model_paths;

#[derive(Args)]
pub struct PlanArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = PlanFormat::Json)]
    pub format: PlanFormat,
}

#[derive(Args)]
pub struct PathsArgs {
    /// Where to write the file. Defaults to extra_model_paths.yaml in the project directory
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

pub fn run(paths: &ConfigPaths, args: PlanArgs) -> Result<()> {
    let loaded = load_config(paths)?;
    let settings_file = file_name(&loaded.settings_path);
    let secrets_file = file_name(&loaded.secrets_path);
    let shipped = ShippedFiles { settings_file: &settings_file, secrets_file: &secrets_file };

    let plan = build_plan(&loaded.config, shipped);
    print!("{}", render_plan(&plan, args.format)?);
    Ok(())
}

pub fn run_paths(paths: &ConfigPaths, args: PathsArgs) -> Result<()> {
    let loaded = load_config(paths)?;
    let output = args.output.unwrap_or_else(|| paths.project_dir.join(EXTRA_MODEL_PATHS_FILE));

    if write_extra_model_paths(&output, &loaded.config.filesystem, args.force)? {
        println!("Wrote {}", output.display());
    } else {
        println!("{} already exists (use --force to overwrite)", output.display());
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string()
}
