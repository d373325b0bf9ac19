//! Events intersecting the requested range.

use anyhow::Result;
use busymirror_core::event::RemoteEvent;
use busymirror_core::interval::TimeInterval;
use busymirror_core::query;
use busymirror_core::remote::protocol::QueryOverlap;

use super::{instant, open_store};

pub async fn handle(cmd: QueryOverlap) -> Result<Vec<RemoteEvent>> {
    let range = TimeInterval::new(instant(&cmd.from, "from")?, instant(&cmd.to, "to")?)?;

    let store = open_store(&cmd.remote_config)?;
    let events = store.load(&cmd.calendar_id).await?;

    Ok(query::events_intersecting(&events, &range))
}
