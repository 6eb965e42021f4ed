//! Command-line interface for comfy-modal
//!
//! Every command resolves configuration once from the project directory and
//! hands the result down by reference.

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::ConfigPaths;

mod check;
mod hooks;
mod plan;
mod setup;

/// Resolve configuration, plan and provision a ComfyUI deployment on Modal
#[derive(Parser)]
#[command(name = "comfy-modal")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    paths: PathArgs,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct PathArgs {
    /// Project directory holding the settings and secrets files
    #[arg(long, global = true, value_name = "DIR", env = "COMFY_MODAL_PROJECT_DIR", default_value = ".")]
    project_dir: PathBuf,

    /// Settings file (TOML, YAML or INI). Defaults to the first of config.toml, config.yaml, config.yml, config.ini in the project directory
    #[arg(short, long, global = true, value_name = "FILE", env = "COMFY_MODAL_CONFIG")]
    config: Option<PathBuf>,

    /// Secrets file in dotenv format. Defaults to .env in the project directory
    #[arg(long, global = true, value_name = "FILE", env = "COMFY_MODAL_ENV_FILE")]
    env_file: Option<PathBuf>,
}

impl PathArgs {
    fn to_config_paths(&self) -> ConfigPaths {
        let mut paths = ConfigPaths::new(&self.project_dir);
        paths.settings = self.config.clone();
        paths.secrets = self.env_file.clone();
        paths
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and validate the configuration, printing it with tokens masked
    Check(check::CheckArgs),

    /// Print the image and service declaration derived from the configuration
    Plan(plan::PlanArgs),

    /// Write extra_model_paths.yaml for the configured volume
    Paths(plan::PathsArgs),

    /// Container start hook: install requirements of custom nodes on the volume
    Enter,

    /// Start the ComfyUI web server
    Launch(hooks::LaunchArgs),

    /// Run the one-time setup: Modal CLI, login, volume, folders, model paths
    Setup(setup::SetupArgs),

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let paths = cli.paths.to_config_paths();
    match cli.command {
        Commands::Check(args) => check::run(&paths, args),
        Commands::Plan(args) => plan::run(&paths, args),
        Commands::Paths(args) => plan::run_paths(&paths, args),
        Commands::Enter => hooks::run_enter(&paths),
        Commands::Launch(args) => hooks::run_launch(&paths, args),
        Commands::Setup(args) => setup::run(paths, args),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "comfy-modal", &mut std::io::stdout());
            Ok(())
        }
    }
}
