//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod init;
mod inspect;
mod synth;

use anyhow::{Context, Result};
use clap::Subcommand;
use cloudmod_core::CodePipeline;
use std::path::{Path, PathBuf};

use crate::config::{Config, load_pipeline_config};

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print the full pipeline declaration as JSON
    Synth {
        /// Path to pipeline config (JSON)
        #[arg(short, long, default_value = "pipeline.json")]
        config: PathBuf,

        /// Write the declaration to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the pipeline stages and their actions
    Stages {
        /// Path to pipeline config (JSON)
        #[arg(short, long, default_value = "pipeline.json")]
        config: PathBuf,
    },
    /// List the permission grants attached to execution roles
    Grants {
        /// Path to pipeline config (JSON)
        #[arg(short, long, default_value = "pipeline.json")]
        config: PathBuf,
    },
    /// Write a starter pipeline config
    Init {
        /// Output directory for the generated file
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Use a GitHub source instead of CodeCommit
        #[arg(long)]
        github: bool,

        /// Include the application delivery stage
        #[arg(long)]
        delivery: bool,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Synth {
            config: path,
            output,
        } => synth::handle_synth(&declare(&path, config)?, output.as_deref()),
        Commands::Stages { config: path } => {
            inspect::print_stages(&declare(&path, config)?);
            Ok(())
        }
        Commands::Grants { config: path } => {
            inspect::print_grants(&declare(&path, config)?);
            Ok(())
        }
        Commands::Init {
            output,
            github,
            delivery,
        } => init::handle_init(&output, github, delivery),
    }
}

/// Load a pipeline config and declare the pipeline it describes
fn declare(path: &Path, config: &Config) -> Result<CodePipeline> {
    config.validate()?;
    let pipeline_config = load_pipeline_config(path)?;
    tracing::debug!("Loaded pipeline config from {}", path.display());

    CodePipeline::new(&pipeline_config, &config.stack_context())
        .with_context(|| format!("Failed to declare pipeline from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(account: &str) -> Config {
        Config {
            account: account.to_string(),
            region: "us-east-1".to_string(),
            stack_name: "CloudmodStack".to_string(),
        }
    }

    #[test]
    fn test_init_ignores_stack_context() {
        let dir = tempfile::tempdir().unwrap();
        let command = Commands::Init {
            output: dir.path().to_path_buf(),
            github: false,
            delivery: false,
        };

        handle_command(command, &config("not-an-account")).unwrap();
        assert!(dir.path().join("pipeline.json").exists());
    }

    #[test]
    fn test_declare_rejects_invalid_stack_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        std::fs::write(&path, r#"{ "repositoryName": "app" }"#).unwrap();

        let err = declare(&path, &config("1234")).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid stack context"));

        assert!(declare(&path, &config("123456789012")).is_ok());
    }
}
