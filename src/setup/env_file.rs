//! Secrets file bootstrap

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub const BACKUP_SUFFIX: &str = ".BAK";

pub const ENV_TEMPLATE: &str = r#"# Keep this file private. It is shipped into the image as /root/.env.
# Paste your tokens here.

# Hugging Face API token (https://huggingface.co/settings/tokens)
HF_TOKEN="your_hf_token_here"

# CivitAI API token (https://civitai.com/user/account)
CIVITAI_API_TOKEN="your_civitai_token_here"
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvFileOutcome {
    AlreadyPresent,
    CopiedFromBackup,
    TemplateWritten,
}

impl EnvFileOutcome {
    /// Whether the operator still has to paste real tokens.
    pub fn needs_editing(self) -> bool {
        !matches!(self, EnvFileOutcome::AlreadyPresent)
    }
}

/// Make sure `env_path` exists: keep it, copy `<env_path>.BAK`, or write the template.
pub fn ensure_env_file(env_path: &Path) -> Result<EnvFileOutcome> {
    if env_path.exists() {
        return Ok(EnvFileOutcome::AlreadyPresent);
    }

    let mut backup = env_path.as_os_str().to_owned();
    backup.push(BACKUP_SUFFIX);
    let backup = Path::new(&backup);

    if backup.is_file() {
        fs::copy(backup, env_path).with_context(|| {
            format!("Failed copying {} to {}", backup.display(), env_path.display())
        })?;
        tracing::info!("Created {} from {}", env_path.display(), backup.display());
        return Ok(EnvFileOutcome::CopiedFromBackup);
    }

    fs::write(env_path, ENV_TEMPLATE)
        .with_context(|| format!("Failed writing {}", env_path.display()))?;
    tracing::info!("Wrote secrets template to {}", env_path.display());
    Ok(EnvFileOutcome::TemplateWritten)
}
