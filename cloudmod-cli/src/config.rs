//! Configuration module
//!
//! Handles the ambient stack identity the CLI declares pipelines in, and
//! loading of pipeline configuration documents.

use anyhow::{Context, Result};
use cloudmod_core::{PipelineConfig, StackContext};
use std::path::Path;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Account the stack deploys into
    pub account: String,

    /// Region the stack deploys into
    pub region: String,

    /// Name of the enclosing stack, used when a pipeline config names none
    pub stack_name: String,
}

impl Config {
    /// Stack context handed to the resolver
    pub fn stack_context(&self) -> StackContext {
        StackContext::new(
            self.account.clone(),
            self.region.clone(),
            self.stack_name.clone(),
        )
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        self.stack_context()
            .validate()
            .context("Invalid stack context")?;
        Ok(())
    }
}

/// Load a pipeline configuration document from disk
pub fn load_pipeline_config(path: &Path) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pipeline config: {}", path.display()))?;

    PipelineConfig::from_json(&content)
        .with_context(|| format!("Failed to parse pipeline config: {}", path.display()))
}
