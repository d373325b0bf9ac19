use anyhow::Result;
use busymirror_core::config::MirrorConfig;
use busymirror_core::report::RunMode;

/// Same reads as `sync`, but nothing is written to the target.
pub async fn run(config: &MirrorConfig) -> Result<()> {
    super::mirror(config, RunMode::Plan).await
}
