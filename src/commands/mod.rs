pub mod config;
pub mod status;
pub mod sync;

use anyhow::Result;
use busymirror_core::config::MirrorConfig;
use busymirror_core::report::RunMode;
use busymirror_core::sync::SyncEngine;

use crate::render::Render;
use crate::utils::tui::spinner_if_terminal;

/// Run the engine and print one line per source event plus a summary.
///
/// Resolution and fetch failures come back as errors so the process exits
/// non-zero. Per-event errors are only reported.
async fn mirror(config: &MirrorConfig, mode: RunMode) -> Result<()> {
    let request = config.sync_request()?;
    let source = config.source.remote();
    let target = config.target.remote();

    println!("{}", request.render());

    let spinner = spinner_if_terminal("   Checking calendars".to_string());
    let result = SyncEngine::new(&source, &target).run(&request, mode).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let report = result?;

    for outcome in &report.outcomes {
        println!("   {}", outcome.render());
    }
    println!();
    println!("{}", report.render());

    Ok(())
}
