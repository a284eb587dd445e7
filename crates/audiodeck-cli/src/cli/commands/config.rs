//! `audiodeck config` – print the effective configuration.

use anyhow::Result;
use audiodeck_core::config::{self, DeckConfig};

pub fn run_config(cfg: &DeckConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
