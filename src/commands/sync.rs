use anyhow::Result;
use busymirror_core::config::MirrorConfig;
use busymirror_core::report::RunMode;

pub async fn run(config: &MirrorConfig) -> Result<()> {
    super::mirror(config, RunMode::Apply).await
}
