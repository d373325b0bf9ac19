use anyhow::Result;
use busymirror_core::connector::CalendarHandle;
use busymirror_core::remote::protocol::ResolveCalendar;

use super::open_store;

pub async fn handle(cmd: ResolveCalendar) -> Result<Option<CalendarHandle>> {
    let store = open_store(&cmd.remote_config)?;
    store.resolve(&cmd.account, &cmd.calendar_name).await
}
