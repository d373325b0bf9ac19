use std::path::Path;

use anyhow::{Context, Result};
use busymirror_core::config::MirrorConfig;
use owo_colors::OwoColorize;

pub fn run(config: &MirrorConfig, explicit_path: Option<&Path>) -> Result<()> {
    let config_path = match explicit_path {
        Some(path) => path.to_path_buf(),
        None => MirrorConfig::config_path()?,
    };

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    for (label, account) in [("Source", &config.source), ("Target", &config.target)] {
        let provider = account.remote().provider;
        println!("  {:<10}  {}", format!("{label}:"), provider.binary_name());
    }

    println!();
    println!("{}", "Settings".bold());
    let settings = toml::to_string_pretty(config).context("Failed to render settings")?;
    for line in settings.lines() {
        println!("  {}", line);
    }

    Ok(())
}
