//! CLI for inspecting how the throttling retry policy treats backend errors.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use cqlretry_core::config;
use cqlretry_core::retry::RetryPolicy;

use commands::{run_classify, run_completions, run_config, run_schedule};

/// Top-level CLI for cqlretry.
#[derive(Debug, Parser)]
#[command(name = "cqlretry")]
#[command(about = "cqlretry: retry decisions for throttling CQL backends", long_about = None)]
pub struct Cli {
    /// Override the configured attempt cap (-1 = unlimited).
    #[arg(long, global = true, allow_negative_numbers = true, value_name = "N")]
    pub max_retries: Option<i64>,

    /// Override the configured fallback backoff base in milliseconds.
    #[arg(long, global = true, value_name = "MS")]
    pub fixed_backoff_ms: Option<u64>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Classify one error message: retry type and wait.
    Classify {
        /// Error text as returned by the driver.
        message: String,
        /// Failures already counted, including this one.
        #[arg(long, default_value = "1", value_name = "N")]
        attempts: u32,
        /// Print a JSON object instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show the waits for N consecutive failures with the same message.
    Schedule {
        /// Error text as returned by the driver.
        message: String,
        /// Number of failures to simulate.
        #[arg(long, default_value = "5", value_name = "N")]
        failures: u32,
    },

    /// Print the config file path and effective retry settings.
    Config,

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

impl Cli {
    /// Policy from the loaded config with command-line overrides applied.
    pub fn policy(&self, cfg: &config::CqlRetryConfig) -> RetryPolicy {
        let mut retry = cfg.retry.clone();
        if let Some(n) = self.max_retries {
            retry.max_retries = n;
        }
        if let Some(ms) = self.fixed_backoff_ms {
            retry.fixed_backoff_ms = ms;
        }
        RetryPolicy::from_config(&retry)
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let policy = cli.policy(&cfg);

        match cli.command {
            CliCommand::Classify {
                message,
                attempts,
                json,
            } => run_classify(&policy, &message, attempts, json)?,
            CliCommand::Schedule { message, failures } => {
                run_schedule(&policy, &message, failures)?
            }
            CliCommand::Config => run_config(&cfg)?,
            CliCommand::Completions { shell } => run_completions(shell)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
