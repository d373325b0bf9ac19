mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use busymirror_core::config::MirrorConfig;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "busymirror")]
#[command(about = "Mirror busy time from one calendar into another without double-booking")]
#[command(version)]
struct Cli {
    /// Config file to use instead of ~/.config/busymirror/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More diagnostics on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Book busy blocks on the target for every unmatched source event
    Sync(Overrides),
    /// Show what sync would book, without writing anything
    Status(Overrides),
    /// Show config paths and the effective settings
    Config,
}

/// Per-run overrides of the config file.
#[derive(Args)]
struct Overrides {
    /// Account owning the source calendar
    #[arg(long)]
    source_account: Option<String>,

    /// Account owning the target calendar
    #[arg(long)]
    target_account: Option<String>,

    /// Calendar name shared by both accounts
    #[arg(short, long)]
    calendar: Option<String>,

    /// How far ahead to look (e.g. "30days", "2weeks")
    #[arg(short, long, value_parser = parse_window)]
    window: Option<String>,
}

impl Overrides {
    fn apply(self, config: &mut MirrorConfig) {
        if let Some(account) = self.source_account {
            config.source.account = Some(account);
        }
        if let Some(account) = self.target_account {
            config.target.account = Some(account);
        }
        if let Some(calendar) = self.calendar {
            config.calendar_name = calendar;
        }
        if let Some(window) = self.window {
            config.window = window;
        }
    }
}

fn parse_window(raw: &str) -> Result<String, humantime::DurationError> {
    humantime::parse_duration(raw).map(|_| raw.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let mut config = MirrorConfig::load(cli.config.as_deref())?;
    debug!(
        calendar = %config.calendar_name,
        source = %config.source.provider,
        target = %config.target.provider,
        "Loaded configuration"
    );

    match cli.command {
        Commands::Sync(overrides) => {
            overrides.apply(&mut config);
            commands::sync::run(&config).await
        }
        Commands::Status(overrides) => {
            overrides.apply(&mut config);
            commands::status::run(&config).await
        }
        Commands::Config => commands::config::run(&config, cli.config.as_deref()),
    }
}

/// Diagnostics go to stderr; stdout carries the per-event report.
fn init_logging(verbose: u8) -> Result<()> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?,
        1 => EnvFilter::try_new("info")?,
        _ => EnvFilter::try_new("debug")?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
