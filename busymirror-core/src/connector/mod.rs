//! The calendar backend boundary.
//!
//! The engine never talks to a backend directly. It is handed a
//! [`Connector`] for each side of the sync and only uses these four
//! operations. Query encoding, authentication, retries and timeouts are the
//! connector's business.

mod memory;

pub use memory::MemoryConnector;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MirrorResult;
use crate::event::{BusyBlock, RemoteEvent};
use crate::interval::TimeInterval;
use crate::overlap::ExistingInterval;
use crate::window::SyncWindow;

/// A resolved calendar on some backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarHandle {
    /// Backend-specific identifier, opaque to the engine
    pub id: String,
    pub account: String,
    pub name: String,
}

#[async_trait]
pub trait Connector: Send + Sync {
    /// Find `calendar_name` under `account`. `Ok(None)` means it does not exist.
    async fn resolve_calendar(
        &self,
        account: &str,
        calendar_name: &str,
    ) -> MirrorResult<Option<CalendarHandle>>;

    /// Events lying inside `window`, in ascending start order.
    async fn list_events(
        &self,
        calendar: &CalendarHandle,
        window: &SyncWindow,
    ) -> MirrorResult<Vec<RemoteEvent>>;

    /// Intervals on `calendar` intersecting `interval`.
    async fn query_overlap(
        &self,
        calendar: &CalendarHandle,
        interval: &TimeInterval,
    ) -> MirrorResult<Vec<ExistingInterval>>;

    async fn create_busy_block(
        &self,
        calendar: &CalendarHandle,
        block: &BusyBlock,
    ) -> MirrorResult<()>;
}
