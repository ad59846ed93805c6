//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;

pub use job::JobArgs;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Submit an asynchronous GP job
    Submit {
        #[command(flatten)]
        args: JobArgs,

        /// Poll until the job reaches a terminal state
        #[arg(long)]
        wait: bool,
    },
    /// Poll the status of an existing job once
    Status {
        /// Server-assigned job identifier
        job_id: String,
    },
    /// Run a synchronous GP task
    Execute {
        #[command(flatten)]
        args: JobArgs,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Submit { args, wait } => job::handle_submit(args, wait, config).await,
        Commands::Status { job_id } => job::handle_status(&job_id, config).await,
        Commands::Execute { args } => job::handle_execute(args, config).await,
    }
}
