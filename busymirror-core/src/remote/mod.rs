//! Calendar connectors backed by provider subprocesses.

pub mod protocol;
pub mod provider;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::connector::{CalendarHandle, Connector};
use crate::error::MirrorResult;
use crate::event::{BusyBlock, RemoteEvent};
use crate::interval::TimeInterval;
use crate::overlap::ExistingInterval;
use crate::query;
use crate::remote::protocol::{CreateEvent, ListEvents, QueryOverlap, ResolveCalendar};
use crate::remote::provider::Provider;
use crate::window::SyncWindow;

/// Provider-specific keys forwarded with every request.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
pub struct RemoteConfig(pub HashMap<String, toml::Value>);

impl From<&RemoteConfig> for serde_json::Map<String, serde_json::Value> {
    fn from(config: &RemoteConfig) -> Self {
        config
            .0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

/// A provider plus the configuration it is called with.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Remote {
    pub provider: Provider,
    #[serde(flatten)]
    pub config: RemoteConfig,
}

impl Remote {
    fn remote_config(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::from(&self.config)
    }

    pub fn new(provider: Provider, config: RemoteConfig) -> Self {
        Remote { provider, config }
    }
}

#[async_trait]
impl Connector for Remote {
    async fn resolve_calendar(
        &self,
        account: &str,
        calendar_name: &str,
    ) -> MirrorResult<Option<CalendarHandle>> {
        self.provider
            .call(ResolveCalendar {
                remote_config: self.remote_config(),
                account: account.to_string(),
                calendar_name: calendar_name.to_string(),
            })
            .await
    }

    async fn list_events(
        &self,
        calendar: &CalendarHandle,
        window: &SyncWindow,
    ) -> MirrorResult<Vec<RemoteEvent>> {
        let mut events = self
            .provider
            .call(ListEvents {
                remote_config: self.remote_config(),
                calendar_id: calendar.id.clone(),
                from: window.start_rfc3339(),
                to: window.end_rfc3339(),
            })
            .await?;
        query::sort_by_start(&mut events);
        Ok(events)
    }

    async fn query_overlap(
        &self,
        calendar: &CalendarHandle,
        interval: &TimeInterval,
    ) -> MirrorResult<Vec<ExistingInterval>> {
        let events = self
            .provider
            .call(QueryOverlap {
                remote_config: self.remote_config(),
                calendar_id: calendar.id.clone(),
                from: interval.start().to_rfc3339(),
                to: interval.end().to_rfc3339(),
            })
            .await?;
        Ok(query::existing_intervals(events))
    }

    async fn create_busy_block(
        &self,
        calendar: &CalendarHandle,
        block: &BusyBlock,
    ) -> MirrorResult<()> {
        self.provider
            .call(CreateEvent {
                remote_config: self.remote_config(),
                calendar_id: calendar.id.clone(),
                event: block.to_remote(),
            })
            .await?;
        Ok(())
    }
}
