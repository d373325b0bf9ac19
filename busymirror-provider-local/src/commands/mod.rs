pub mod create_event;
pub mod list_events;
pub mod query_overlap;
pub mod resolve_calendar;

use anyhow::{Result, anyhow};
use busymirror_core::event::parse_instant;
use chrono::{DateTime, Utc};

use crate::remote_config::LocalRemoteConfig;
use crate::store::LocalStore;

pub fn open_store(remote_config: &serde_json::Map<String, serde_json::Value>) -> Result<LocalStore> {
    let config = LocalRemoteConfig::try_from(remote_config)?;
    Ok(LocalStore::new(config.root()?))
}

/// Parse a request bound.
pub fn instant(raw: &str, field: &str) -> Result<DateTime<Utc>> {
    parse_instant(raw).ok_or_else(|| anyhow!("Invalid '{}' timestamp: '{}'", field, raw))
}
