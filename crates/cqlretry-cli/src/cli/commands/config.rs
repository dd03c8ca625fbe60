//! `cqlretry config` – show where the config lives and what it says.

use anyhow::Result;
use cqlretry_core::config::{self, CqlRetryConfig};

pub fn run_config(cfg: &CqlRetryConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    print!("{}", effective_toml(cfg)?);
    Ok(())
}

/// The config with matcher defaults spelled out.
fn effective_toml(cfg: &CqlRetryConfig) -> Result<String> {
    let mut effective = cfg.clone();
    let matcher = effective.retry.matcher();
    effective.retry.signature = Some(matcher.signature().to_string());
    effective.retry.hint_label = Some(matcher.hint_label().to_string());
    Ok(toml::to_string_pretty(&effective)?)
}
