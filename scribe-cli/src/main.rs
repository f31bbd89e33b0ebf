//! Scribe CLI
//!
//! Command-line front end for the content-generation API: starts title,
//! outline and blog generation jobs and watches them until they finish.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "scribe")]
#[command(about = "Scribe content-generation CLI", long_about = None)]
struct Cli {
    /// API base URL
    #[arg(
        long,
        env = "SCRIBE_API_URL",
        default_value = "http://localhost:3000/api"
    )]
    api_url: String,

    /// Bearer token issued by the identity provider
    #[arg(long, env = "SCRIBE_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scribe_cli=warn,scribe_poller=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::new(cli.api_url, cli.api_token)?;

    handle_command(cli.command, &config).await
}
