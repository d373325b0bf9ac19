//! busymirror-provider-local - calendars kept as JSON files on disk
//!
//! This binary implements the busymirror provider protocol, communicating
//! with busymirror via JSON over stdin/stdout.
//!
//! Calendars live under a root directory:
//!   <root>/<account>/<calendar>.json
//!
//! The root is the `local_root` key of the account's config table, or the
//! platform data directory (e.g. ~/.local/share/busymirror).

mod commands;
mod remote_config;
mod store;

use std::future::Future;
use std::io::{self, BufRead, Write};

use anyhow::Result;
use busymirror_core::remote::protocol::{Command, Request, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

#[tokio::main]
async fn main() -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Failed to read stdin: {}", e);
                break;
            }
        };

        // Skip empty lines
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle_request(request).await,
            Err(e) => Response::<()>::error(&format!("Failed to parse request: {}", e)),
        };

        writeln!(stdout, "{}", response)?;
        stdout.flush()?;
    }

    Ok(())
}

async fn handle_request(request: Request) -> String {
    match request.command {
        Command::ResolveCalendar => {
            respond(request.params, commands::resolve_calendar::handle).await
        }
        Command::ListEvents => respond(request.params, commands::list_events::handle).await,
        Command::QueryOverlap => respond(request.params, commands::query_overlap::handle).await,
        Command::CreateEvent => respond(request.params, commands::create_event::handle).await,
    }
}

/// Decode the command's params, run its handler and encode the outcome.
async fn respond<C, R, F, Fut>(params: serde_json::Value, handler: F) -> String
where
    C: DeserializeOwned,
    R: Serialize,
    F: FnOnce(C) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    let cmd: C = match serde_json::from_value(params) {
        Ok(c) => c,
        Err(e) => return Response::<()>::error(&format!("Invalid params: {}", e)),
    };

    match handler(cmd).await {
        Ok(data) => Response::success(data),
        Err(e) => Response::<()>::error(&format!("{:#}", e)),
    }
}
