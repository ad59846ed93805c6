//! GP job command handlers
//!
//! Handles submitting jobs, polling existing jobs, and running synchronous
//! tasks, with human-readable colored output.

use anyhow::{Result, bail};
use clap::Args;
use colored::*;

use ags_client::GpJob;
use ags_core::domain::job::{JobMessage, JobStatus, MessageKind, TaskResult};

use crate::config::Config;

/// Task inputs shared by `submit` and `execute`
#[derive(Args)]
pub struct JobArgs {
    /// Input parameter as name=value (repeatable)
    #[arg(short = 'p', long = "param", value_name = "NAME=VALUE")]
    params: Vec<String>,

    /// Output spatial reference (env:outputSR)
    #[arg(long)]
    out_sr: Option<String>,

    /// Processing spatial reference (env:processSR)
    #[arg(long)]
    process_sr: Option<String>,

    /// Include Z values in output geometry
    #[arg(long)]
    return_z: bool,

    /// Include M values in output geometry
    #[arg(long)]
    return_m: bool,
}

impl JobArgs {
    /// Build a job handle from the CLI inputs
    fn into_job(self, config: &Config) -> Result<GpJob> {
        let mut job = GpJob::new(&config.service_url)
            .return_z(self.return_z)
            .return_m(self.return_m)
            .poll_interval(config.poll_interval);

        for param in &self.params {
            let (name, value) = parse_param(param)?;
            job = job.parameter(name, value);
        }
        if let Some(sr) = self.out_sr {
            job = job.output_spatial_reference(sr);
        }
        if let Some(sr) = self.process_sr {
            job = job.process_spatial_reference(sr);
        }
        if let Some(timeout) = config.poll_timeout {
            job = job.poll_timeout(timeout);
        }
        Ok(job)
    }
}

/// Split a name=value CLI parameter
fn parse_param(raw: &str) -> Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name, value)),
        _ => bail!("invalid parameter '{}', expected NAME=VALUE", raw),
    }
}

/// Submit an asynchronous job, optionally waiting for completion
pub async fn handle_submit(args: JobArgs, wait: bool, config: &Config) -> Result<()> {
    let mut job = args.into_job(config)?;

    let status = if wait {
        job.submit_and_wait().await?
    } else {
        job.submit().await?
    };

    if let Some(job_id) = job.job_id() {
        println!("Job ID: {}", job_id.cyan());
    }
    print_snapshot(status, job.messages(), job.results());

    Ok(())
}

/// Poll an existing job once and print its snapshot
pub async fn handle_status(job_id: &str, config: &Config) -> Result<()> {
    let mut job = GpJob::attach(&config.service_url, job_id);
    let status = job.poll_once().await?;

    print_snapshot(status, job.messages(), job.results());

    Ok(())
}

/// Run a synchronous task and print its outcome
pub async fn handle_execute(args: JobArgs, config: &Config) -> Result<()> {
    let mut job = args.into_job(config)?;
    let status = job.execute().await?;

    print_snapshot(status, job.messages(), job.results());

    Ok(())
}

/// Print status, messages, and results
fn print_snapshot(
    status: JobStatus,
    messages: &[JobMessage],
    results: &std::collections::HashMap<String, TaskResult>,
) {
    println!("Status: {}", colorize_status(status));

    if !messages.is_empty() {
        println!("\n{}", "Messages:".bold());
        for message in messages {
            print_message(message);
        }
    }

    if !results.is_empty() {
        println!("\n{}", "Results:".bold());
        let mut names: Vec<_> = results.keys().collect();
        names.sort();
        for name in names {
            let result = &results[name];
            println!("  {} ({})", name.cyan(), result.data_type.dimmed());
            if let Ok(pretty) = serde_json::to_string_pretty(&result.value) {
                for line in pretty.lines() {
                    println!("    {}", line);
                }
            }
        }
    }
}

/// Print a single job message with its severity
fn print_message(message: &JobMessage) {
    let label = match message.kind {
        MessageKind::Informative => "INFO".cyan(),
        MessageKind::Warning => "WARN".yellow(),
        MessageKind::Error => "ERROR".red(),
        MessageKind::Empty => "EMPTY".dimmed(),
        MessageKind::Abort => "ABORT".red(),
    };
    println!("  [{}] {}", label, message.text);
}

/// Colorize job status for display
fn colorize_status(status: JobStatus) -> colored::ColoredString {
    let text = status.to_string();
    match status {
        JobStatus::NotSubmitted => text.dimmed(),
        JobStatus::Waiting | JobStatus::Submitted => text.yellow(),
        JobStatus::Running | JobStatus::Cancelling => text.cyan(),
        JobStatus::Succeeded => text.green(),
        JobStatus::Failed => text.red(),
        JobStatus::Cancelled => text.dimmed(),
    }
}
