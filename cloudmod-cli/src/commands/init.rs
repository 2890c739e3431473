//! Init command handler
//!
//! Generates a starter pipeline configuration document.

use anyhow::{Context, Result};
use cloudmod_core::{PipelineConfig, SourceType};
use colored::*;
use std::fs;
use std::path::Path;

/// File name of the generated pipeline config
pub const PIPELINE_CONFIG_FILE: &str = "pipeline.json";

/// Write a starter `pipeline.json` into `output_dir`
///
/// Refuses to overwrite an existing file.
pub fn handle_init(output_dir: &Path, github: bool, delivery: bool) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory {:?}", output_dir))?;

    let config_path = output_dir.join(PIPELINE_CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    let content = serde_json::to_string_pretty(&starter_config(github, delivery))
        .context("Failed to serialize starter config")?;

    fs::write(&config_path, format!("{}\n", content))
        .with_context(|| format!("Failed to write {:?}", config_path))?;

    println!("  {} {}", "Created".green(), config_path.display());
    println!();
    println!("{}", "Next steps:".bold());
    if github {
        println!("  1. Set accountOwner and oauthSecretArn to your GitHub owner and token secret");
    } else {
        println!("  1. Set repositoryName, or leave it empty to generate one");
    }
    println!(
        "  2. Use {} to inspect the declared stages",
        "cloudmod stages".cyan()
    );

    Ok(())
}

/// Starter configuration with every field spelled out
fn starter_config(github: bool, delivery: bool) -> PipelineConfig {
    let config = if github {
        PipelineConfig::new("my-app").with_github(
            "my-org",
            "arn:aws:secretsmanager:us-east-1:000000000000:secret:github-token",
        )
    } else {
        PipelineConfig::new("")
            .with_source(SourceType::CodeCommit)
            .with_create_repository(true)
    };

    config.with_branch("master").with_app_delivery(delivery)
}
