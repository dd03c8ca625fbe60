//! Tests for config, completions and global overrides.

use super::{parse, parse_cli};
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use clap_complete::Shell;
use cqlretry_core::config::CqlRetryConfig;
use cqlretry_core::retry::MaxRetries;
use std::time::Duration;

#[test]
fn cli_parse_config() {
    match parse(&["cqlretry", "config"]) {
        CliCommand::Config => {}
        _ => panic!("expected Config"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["cqlretry", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, Shell::Bash),
        _ => panic!("expected Completions"),
    }
}

#[test]
fn cli_global_overrides_apply_to_policy() {
    let cli = parse_cli(&[
        "cqlretry",
        "classify",
        "x",
        "--max-retries",
        "-1",
        "--fixed-backoff-ms",
        "250",
    ]);
    let policy = cli.policy(&CqlRetryConfig::default());
    assert_eq!(policy.max_retries(), MaxRetries::Unlimited);
    assert_eq!(policy.fixed_backoff(), Duration::from_millis(250));
}

#[test]
fn cli_without_overrides_uses_config() {
    let cli = parse_cli(&["cqlretry", "config"]);
    let policy = cli.policy(&CqlRetryConfig::default());
    assert_eq!(policy.max_retries(), MaxRetries::Limited(10));
    assert_eq!(policy.fixed_backoff(), Duration::from_millis(1000));
}

#[test]
fn cli_requires_subcommand() {
    assert!(Cli::try_parse_from(["cqlretry"]).is_err());
}
