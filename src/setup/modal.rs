//! Thin wrapper over the `modal` command-line client

use crate::process::{output_or_failed, CommandOutput, CommandRunner};

const MODAL: &str = "modal";

pub struct ModalCli<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> ModalCli<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    pub fn is_installed(&self) -> bool {
        output_or_failed(self.runner, MODAL, &["--version"]).success
    }

    /// Listing volumes only succeeds with a valid token.
    pub fn is_authenticated(&self) -> bool {
        output_or_failed(self.runner, MODAL, &["volume", "list"]).success
    }

    pub fn install(&self) -> bool {
        self.runner.status("pip", &["install", "modal"]).unwrap_or(false)
    }

    /// Interactive browser login.
    pub fn authenticate(&self) -> bool {
        self.runner.status(MODAL, &["setup"]).unwrap_or(false)
    }

    pub fn create_volume(&self, name: &str) -> VolumeResult {
        let out = output_or_failed(self.runner, MODAL, &["volume", "create", name]);
        VolumeResult::from_output(out)
    }

    /// Upload `local` to `remote` inside the volume. Creates intermediate folders.
    pub fn put(&self, volume: &str, local: &str, remote: &str) -> VolumeResult {
        let out = output_or_failed(self.runner, MODAL, &["volume", "put", volume, local, remote]);
        VolumeResult::from_output(out)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeResult {
    Created,
    AlreadyExists,
    Failed(String),
}

impl VolumeResult {
    fn from_output(out: CommandOutput) -> Self {
        if out.success {
            VolumeResult::Created
        } else if out.stderr.contains("already exists") {
            VolumeResult::AlreadyExists
        } else if !out.stderr.trim().is_empty() {
            VolumeResult::Failed(out.stderr.trim().to_string())
        } else {
            match out.code {
                Some(code) => VolumeResult::Failed(format!("exited with status {code}")),
                None => VolumeResult::Failed("terminated by a signal".to_string()),
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        !matches!(self, VolumeResult::Failed(_))
    }
}
