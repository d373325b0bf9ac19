//! Events lying entirely inside the requested range.

use anyhow::Result;
use busymirror_core::event::RemoteEvent;
use busymirror_core::query;
use busymirror_core::remote::protocol::ListEvents;
use busymirror_core::window::SyncWindow;

use super::{instant, open_store};

pub async fn handle(cmd: ListEvents) -> Result<Vec<RemoteEvent>> {
    let from = instant(&cmd.from, "from")?;
    let to = instant(&cmd.to, "to")?;
    let window = SyncWindow::starting_at(from, to - from)?;

    let store = open_store(&cmd.remote_config)?;
    let events = store.load(&cmd.calendar_id).await?;

    Ok(query::events_in_window(&events, &window))
}
