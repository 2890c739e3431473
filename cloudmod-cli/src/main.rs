//! Cloudmod CLI
//!
//! Command-line interface for declaring and inspecting cloudmod pipelines.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cloudmod")]
#[command(about = "Cloudmod continuous-delivery pipeline CLI", long_about = None)]
struct Cli {
    /// Account id of the target stack
    #[arg(long, env = "CDK_DEFAULT_ACCOUNT", default_value = "000000000000")]
    account: String,

    /// Region of the target stack
    #[arg(long, env = "CDK_DEFAULT_REGION", default_value = "us-east-1")]
    region: String,

    /// Stack name used when the pipeline config names none
    #[arg(long, env = "CLOUDMOD_STACK_NAME", default_value = "CloudmodStack")]
    stack_name: String,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Logs go to stderr so synthesized output on stdout stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cloudmod=info,cloudmod_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        account: cli.account,
        region: cli.region,
        stack_name: cli.stack_name,
    };

    handle_command(cli.command, &config)
}
