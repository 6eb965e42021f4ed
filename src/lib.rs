//! comfy-modal: configuration and provisioning for ComfyUI on Modal
//!
//! Resolves a settings file and a secrets file into one validated
//! configuration, derives the image and service declaration from it, and
//! drives the one-time setup of the Modal client and persistent volume.

pub mod cli;
pub mod config;
pub mod deploy;
pub mod domain;
pub mod hooks;
pub mod process;
pub mod redact;
pub mod setup;
