//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod calendar;
mod generate;
mod job;
mod watch;

pub use calendar::CalendarCommands;
pub use generate::{BlogCommands, OutlineCommands, TitlesCommands};
pub use job::JobCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Inspect and watch generation jobs
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Blog title generation
    Titles {
        #[command(subcommand)]
        command: TitlesCommands,
    },
    /// Outline generation
    Outline {
        #[command(subcommand)]
        command: OutlineCommands,
    },
    /// Blog post generation
    Blog {
        #[command(subcommand)]
        command: BlogCommands,
    },
    /// Content calendar planning
    Calendar {
        #[command(subcommand)]
        command: CalendarCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
///
/// # Returns
/// Result indicating success or failure
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Job { command } => job::handle_job_command(command, config).await,
        Commands::Titles { command } => generate::handle_titles_command(command, config).await,
        Commands::Outline { command } => generate::handle_outline_command(command, config).await,
        Commands::Blog { command } => generate::handle_blog_command(command, config).await,
        Commands::Calendar { command } => {
            calendar::handle_calendar_command(command, config).await
        }
    }
}
