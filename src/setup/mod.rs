//! One-time interactive setup
//!
//! Installs and authenticates the Modal client, prepares the persistent
//! volume, writes `extra_model_paths.yaml` and checks that everything a
//! deployment needs is in place.

pub mod env_file;
pub mod modal;
pub mod model_paths;

use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{load_config, ConfigPaths, LoadedConfig};
use crate::deploy::image::EXTRA_MODEL_PATHS_FILE;
use crate::process::CommandRunner;
use crate::redact::Redactor;
use env_file::{ensure_env_file, EnvFileOutcome};
use modal::{ModalCli, VolumeResult};
use model_paths::write_extra_model_paths;

/// Folders created at the root of the volume.
pub const VOLUME_FOLDERS: &[&str] = &[
    "checkpoints",
    "text_encoders",
    "diffusion_models",
    "embeddings",
    "loras",
    "unet",
    "vae",
    "model_patches",
    "custom_nodes",
    "output",
];

/// Empty file uploaded into each folder, since volumes have no mkdir.
const MARKER_FILE: &str = ".emptyfile";

const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy)]
pub struct SetupOptions {
    /// Pause for the operator between steps.
    pub interactive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub name: String,
    pub passed: bool,
}

#[derive(Debug, Clone)]
pub struct SetupSummary {
    pub volume: VolumeResult,
    pub failed_folders: Vec<String>,
    pub checks: Vec<Check>,
}

pub struct SetupWizard<'a> {
    paths: ConfigPaths,
    runner: &'a dyn CommandRunner,
    options: SetupOptions,
}

impl<'a> SetupWizard<'a> {
    pub fn new(paths: ConfigPaths, runner: &'a dyn CommandRunner, options: SetupOptions) -> Self {
        Self { paths, runner, options }
    }

    fn modal(&self) -> ModalCli<'a> {
        ModalCli::new(self.runner)
    }

    fn model_paths_file(&self) -> PathBuf {
        self.paths.project_dir.join(EXTRA_MODEL_PATHS_FILE)
    }

    pub fn run(&self) -> Result<SetupSummary> {
        print_title();

        let loaded = self.load_configuration()?;
        let volume_name = loaded.config.filesystem.volume_name.as_str();
        let redactor = Redactor::for_config(&loaded.config);

        self.install_cli()?;
        self.authenticate()?;
        let volume = self.create_volume(volume_name, &redactor);
        let failed_folders = self.setup_folder_structure(volume_name, &redactor)?;
        self.model_guidance(volume_name)?;
        self.generate_yaml_config(&loaded)?;

        let checks = self.verify(&loaded);
        if !checks.iter().all(|c| c.passed) {
            anyhow::bail!("Some setup checks failed. Please review the output above.");
        }
        self.print_next_steps(&loaded);

        Ok(SetupSummary { volume, failed_folders, checks })
    }

    fn load_configuration(&self) -> Result<LoadedConfig> {
        let env_path = self.paths.secrets_path();
        let outcome = ensure_env_file(&env_path)?;
        match outcome {
            EnvFileOutcome::AlreadyPresent => {}
            EnvFileOutcome::CopiedFromBackup => ok(&format!("Created {} from backup", env_path.display())),
            EnvFileOutcome::TemplateWritten => ok(&format!("Wrote template {}", env_path.display())),
        }

        let loaded = load_config(&self.paths).with_context(|| {
            if outcome.needs_editing() {
                format!(
                    "Edit {} with your Hugging Face and CivitAI tokens, then re-run setup",
                    env_path.display()
                )
            } else {
                "Failed to load configuration".to_string()
            }
        })?;
        ok("Configuration loaded");
        Ok(loaded)
    }

    fn install_cli(&self) -> Result<()> {
        banner("INSTALLING MODAL CLI");
        let modal = self.modal();
        if modal.is_installed() {
            ok("Modal is already installed");
            return Ok(());
        }

        println!("Installing Modal...");
        if !modal.install() {
            fail("Failed to install Modal");
            anyhow::bail!("`pip install modal` failed");
        }
        ok("Modal installed");
        Ok(())
    }

    fn authenticate(&self) -> Result<()> {
        banner("AUTHENTICATING WITH MODAL");
        let modal = self.modal();
        if modal.is_authenticated() {
            ok("Modal is already authenticated");
            return Ok(());
        }

        println!("Opening browser for authentication...");
        println!("Run 'modal setup' manually if the browser does not open.");
        if !modal.authenticate() {
            fail("Modal authentication failed");
            anyhow::bail!("`modal setup` failed");
        }
        ok("Modal authentication successful");
        Ok(())
    }

    fn create_volume(&self, volume_name: &str, redactor: &Redactor) -> VolumeResult {
        banner("CREATING PERSISTENT VOLUME");
        println!("Creating volume: {volume_name}");

        let result = self.modal().create_volume(volume_name);
        match &result {
            VolumeResult::Created | VolumeResult::AlreadyExists => {
                ok(&format!("Volume '{volume_name}' ready"));
            }
            VolumeResult::Failed(stderr) => {
                fail(&format!("Failed to create volume: {}", redactor.scrub(stderr)));
            }
        }
        result
    }

    /// Returns the folders that could not be created.
    fn setup_folder_structure(&self, volume_name: &str, redactor: &Redactor) -> Result<Vec<String>> {
        banner("SETTING UP FOLDER STRUCTURE");
        let marker = ensure_marker(&self.paths.project_dir)?;
        let marker = marker.to_string_lossy();
        println!("Creating folder structure in '{volume_name}'... this takes a moment.");

        let modal = self.modal();
        let bar = ProgressBar::new(VOLUME_FOLDERS.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("  {bar:30} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let mut failed = Vec::new();
        for folder in VOLUME_FOLDERS {
            bar.set_message(*folder);
            let result = modal.put(volume_name, &marker, &format!("{folder}/"));
            bar.suspend(|| match &result {
                VolumeResult::Failed(stderr) => {
                    fail(&format!("{folder}/ ({})", redactor.scrub(stderr)));
                }
                _ => ok(&format!("{folder}/")),
            });
            if !result.is_ready() {
                failed.push((*folder).to_string());
            }
            bar.inc(1);
        }
        bar.finish_and_clear();

        if failed.is_empty() {
            ok("Folder structure created");
        } else {
            tracing::warn!("{} folder(s) could not be created", failed.len());
        }
        Ok(failed)
    }

    fn model_guidance(&self, volume_name: &str) -> Result<()> {
        banner("DOWNLOADING MODELS (OPTIONAL)");
        println!("Model downloads are not automated.");
        println!("Drop into your volume's shell with:");
        println!("    modal shell --volume {volume_name}");
        println!("and download models with wget or curl.");
        println!("Alternatively, upload from this machine with 'modal volume put'.");
        println!("Run 'sync' inside the volume shell after downloading so the files are persisted.");
        self.pause()
    }

    fn generate_yaml_config(&self, loaded: &LoadedConfig) -> Result<()> {
        let path = self.model_paths_file();
        if path.exists() {
            banner("YAML CONFIGURATION ALREADY EXISTS");
            ok(&format!("{EXTRA_MODEL_PATHS_FILE} already exists, skipping generation"));
            return Ok(());
        }

        banner("GENERATING YAML CONFIGURATION");
        write_extra_model_paths(&path, &loaded.config.filesystem, false)
            .context("Failed to generate YAML configuration")?;
        ok(&format!("Generated {EXTRA_MODEL_PATHS_FILE}"));
        Ok(())
    }

    fn verify(&self, loaded: &LoadedConfig) -> Vec<Check> {
        banner("VERIFYING SETUP");
        let modal = self.modal();
        let checks = vec![
            check("Modal CLI", modal.is_installed()),
            check("Modal authentication", modal.is_authenticated()),
            check(&file_label(&loaded.secrets_path), loaded.secrets_path.exists()),
            check(&file_label(&loaded.settings_path), loaded.settings_path.exists()),
            check(EXTRA_MODEL_PATHS_FILE, self.model_paths_file().exists()),
        ];
        for c in &checks {
            if c.passed {
                ok(&c.name);
            } else {
                fail(&c.name);
            }
        }
        checks
    }

    fn print_next_steps(&self, loaded: &LoadedConfig) {
        let volume = &loaded.config.filesystem.volume_name;
        banner("SETUP COMPLETE");
        println!();
        println!("Next steps:");
        println!();
        println!("1. Edit your configuration (optional):");
        println!("   {}", loaded.settings_path.display());
        println!();
        println!("2. Check your tokens:");
        println!("   {}", loaded.secrets_path.display());
        println!();
        println!("3. Add custom nodes (optional):");
        println!("   Find nodes at https://registry.comfy.org and place them in the");
        println!("   volume's custom_nodes/ folder. Their requirements install on container start.");
        println!();
        println!("4. Add models:");
        println!("   modal volume put {volume} <local-path> <remote-path>");
        println!("   or open a shell with 'modal shell --volume {volume}', cd to");
        println!("   /mnt/{volume}/diffusion_models/ (or another folder), download, then run 'sync'.");
        println!();
        println!("5. Review the deployment plan:");
        println!("   comfy-modal plan");
        println!();
        println!("Tips:");
        println!("   - 'modal logs --app <app-name>' shows logs");
        println!("   - 'modal volume ls {volume}' browses the volume");
    }

    fn pause(&self) -> Result<()> {
        if !self.options.interactive {
            return Ok(());
        }
        Input::<String>::new()
            .with_prompt("Press Enter to continue")
            .allow_empty(true)
            .interact_text()
            .context("Setup cancelled by user")?;
        Ok(())
    }
}

fn ensure_marker(project_dir: &Path) -> Result<PathBuf> {
    let marker = project_dir.join(MARKER_FILE);
    if !marker.exists() {
        fs::write(&marker, b"").with_context(|| format!("Failed creating {}", marker.display()))?;
    }
    Ok(marker)
}

fn file_label(path: &Path) -> String {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("").to_string()
}

fn check(name: &str, passed: bool) -> Check {
    Check { name: name.to_string(), passed }
}

fn print_title() {
    println!();
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("{:^width$}", "Modal x ComfyUI Setup", width = RULE_WIDTH);
    println!("{}", "=".repeat(RULE_WIDTH));
}

fn banner(title: &str) {
    println!();
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("{}", style(title).bold());
    println!("{}", "=".repeat(RULE_WIDTH));
}

fn ok(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

fn fail(message: &str) {
    println!("{} {}", style("✗").red(), message);
}
