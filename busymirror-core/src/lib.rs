//! Busy-time mirroring engine.
//!
//! - [`overlap`]: the tolerant match rule between a candidate and existing busy time
//! - [`decision`]: per-event Book / Skip / Error decisions
//! - [`sync`]: the orchestrator driving a whole run
//! - [`connector`]: the backend boundary, with an in-memory implementation
//! - [`remote`]: connectors backed by provider subprocesses speaking JSON

pub mod config;
pub mod connector;
pub mod constants;
pub mod decision;
pub mod error;
pub mod event;
pub mod interval;
pub mod overlap;
pub mod query;
pub mod recurrence;
pub mod remote;
pub mod report;
pub mod sync;
pub mod window;
