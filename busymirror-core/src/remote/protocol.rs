//! Defines the JSON protocol used for communication between busymirror
//! and provider binaries over stdin/stdout.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::connector::CalendarHandle;
use crate::event::RemoteEvent;

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    ResolveCalendar,
    ListEvents,
    QueryOverlap,
    CreateEvent,
}

/// Request sent from busymirror to a provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from a provider back to busymirror.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> String {
        serde_json::to_string(&Response::Success { data })
            .unwrap_or_else(|e| Response::<()>::error(&format!("Failed to encode response: {}", e)))
    }
}

impl Response<()> {
    pub fn error(msg: &str) -> String {
        // A plain string payload always encodes.
        serde_json::json!({ "status": "error", "error": msg }).to_string()
    }
}

/// Look up a calendar by account and name.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveCalendar {
    /// Provider-specific config from the account's table
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub account: String,
    pub calendar_name: String,
}

impl ProviderCommand for ResolveCalendar {
    type Response = Option<CalendarHandle>;
    fn command() -> Command {
        Command::ResolveCalendar
    }
}

/// List events lying entirely inside `[from, to]`, in ascending start order.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub calendar_id: String,
    pub from: String,
    pub to: String,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<RemoteEvent>;
    fn command() -> Command {
        Command::ListEvents
    }
}

/// List events intersecting `[from, to]`.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryOverlap {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub calendar_id: String,
    pub from: String,
    pub to: String,
}

impl ProviderCommand for QueryOverlap {
    type Response = Vec<RemoteEvent>;
    fn command() -> Command {
        Command::QueryOverlap
    }
}

/// Create a new event.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub calendar_id: String,
    pub event: RemoteEvent,
}

impl ProviderCommand for CreateEvent {
    type Response = RemoteEvent;
    fn command() -> Command {
        Command::CreateEvent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_flattens_remote_config() {
        let mut remote_config = serde_json::Map::new();
        remote_config.insert("local_root".into(), serde_json::json!("~/cals"));

        let cmd = QueryOverlap {
            remote_config,
            calendar_id: "me/Calendar".into(),
            from: "2025-03-01T09:00:00+00:00".into(),
            to: "2025-03-01T10:00:00+00:00".into(),
        };
        let request = Request {
            command: QueryOverlap::command(),
            params: serde_json::to_value(&cmd).unwrap(),
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["command"], "query_overlap");
        assert_eq!(json["params"]["local_root"], "~/cals");
        assert_eq!(json["params"]["calendar_id"], "me/Calendar");
    }

    #[test]
    fn responses_are_tagged_by_status() {
        let ok: Response<Option<CalendarHandle>> =
            serde_json::from_str(&Response::success(None::<CalendarHandle>)).unwrap();
        assert!(matches!(ok, Response::Success { data: None }));

        let err: Response<Vec<RemoteEvent>> =
            serde_json::from_str(&Response::error("no such account")).unwrap();
        match err {
            Response::Error { error } => assert_eq!(error, "no such account"),
            Response::Success { .. } => panic!("expected error response"),
        }
    }
}
