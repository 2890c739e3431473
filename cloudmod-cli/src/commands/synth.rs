//! Synth command handler
//!
//! Renders the complete pipeline declaration as JSON for the provisioning
//! side to consume.

use anyhow::{Context, Result};
use cloudmod_core::CodePipeline;
use colored::*;
use std::path::Path;

/// Write the declaration to `output`, or to stdout when no path is given
pub fn handle_synth(pipeline: &CodePipeline, output: Option<&Path>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(&pipeline.manifest())
        .context("Failed to serialize pipeline declaration")?;

    match output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", rendered))
                .with_context(|| format!("Failed to write declaration to {}", path.display()))?;

            eprintln!(
                "{} {}",
                "✓ Pipeline declaration written to".green().bold(),
                path.display().to_string().cyan()
            );
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
