//! Setup command implementation

use anyhow::Result;
use clap::Args;
use std::io::IsTerminal;

use crate::config::ConfigPaths;
use crate::process::SystemRunner;
use crate::setup::{SetupOptions, SetupWizard};

#[derive(Args)]
pub struct SetupArgs {
    /// Never pause for input
    #[arg(short, long)]
    pub yes: bool,
}

pub fn run(paths: ConfigPaths, args: SetupArgs) -> Result<()> {
    let interactive_terminal = std::io::stdin().is_terminal() && std::io::stdout().is_terminal();
    let options = SetupOptions { interactive: interactive_terminal && !args.yes };

    let runner = SystemRunner;
    SetupWizard::new(paths, &runner, options).run()?;
    Ok(())
}
