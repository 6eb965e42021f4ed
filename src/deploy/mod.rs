//! Deployment plan: what the platform is asked to build and run
//!
//! The plan is a pure function of the resolved configuration. Rendering it
//! never exposes token values.

pub mod image;
pub mod service;

use anyhow::Result;
use serde::Serialize;

pub use image::{build_image, ImageSpec, ShippedFiles};
pub use service::{build_service, ServiceSpec};

use crate::domain::ResolvedConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentPlan {
    pub image: ImageSpec,
    pub service: ServiceSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PlanFormat {
    Json,
    Yaml,
}

pub fn build_plan(config: &ResolvedConfig, shipped: ShippedFiles<'_>) -> DeploymentPlan {
    DeploymentPlan { image: build_image(config, shipped), service: build_service(config) }
}

pub fn render_plan(plan: &DeploymentPlan, format: PlanFormat) -> Result<String> {
    let rendered = match format {
        PlanFormat::Json => format!("{}\n", serde_json::to_string_pretty(plan)?),
        PlanFormat::Yaml => serde_yaml::to_string(plan)?,
    };
    Ok(rendered)
}
