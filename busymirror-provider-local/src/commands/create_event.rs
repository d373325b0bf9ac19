use anyhow::Result;
use busymirror_core::event::RemoteEvent;
use busymirror_core::remote::protocol::CreateEvent;
use uuid::Uuid;

use super::open_store;

pub async fn handle(cmd: CreateEvent) -> Result<RemoteEvent> {
    let store = open_store(&cmd.remote_config)?;
    let mut events = store.load(&cmd.calendar_id).await?;

    // The store assigns ids; any id on the incoming event is replaced
    let mut event = cmd.event;
    event.id = Some(Uuid::new_v4().to_string());

    events.push(event.clone());
    store.save(&cmd.calendar_id, &events).await?;

    Ok(event)
}
