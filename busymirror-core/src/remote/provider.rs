//! Provider subprocess protocol.
//!
//! This module handles communication with external provider binaries
//! (e.g., `busymirror-provider-local`) using JSON over stdin/stdout.
//!
//! The protocol is language-agnostic: any executable that speaks it can be
//! a provider. Providers manage their own credentials; the engine only
//! passes along the keys from the account's configuration table.

use crate::error::{MirrorError, MirrorResult};
use crate::remote::protocol::{Command, ProviderCommand, Request, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use tracing::debug;

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider(String);

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider(name.to_string())
    }

    pub fn binary_name(&self) -> String {
        format!("busymirror-provider-{}", self.0)
    }

    fn binary_path(&self) -> MirrorResult<std::path::PathBuf> {
        let binary_name = self.binary_name();
        which::which(&binary_name).map_err(|_| {
            MirrorError::ProviderNotInstalled(format!(
                "Provider '{}' not found. Install it with:\n  cargo install {}",
                self.0, binary_name
            ))
        })
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type is inferred from the command's associated type.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> MirrorResult<C::Response> {
        timeout(PROVIDER_TIMEOUT, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| MirrorError::ProviderTimeout(PROVIDER_TIMEOUT.as_secs()))?
    }

    /// Low-level call that sends a command with params and deserializes the response.
    async fn call_raw<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> MirrorResult<R> {
        let params =
            serde_json::to_value(params).map_err(|e| MirrorError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json =
            serde_json::to_string(&request).map_err(|e| MirrorError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        debug!(provider = %self.0, ?command, "Calling provider");

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                MirrorError::Provider(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| MirrorError::Provider("Provider stdin was not captured".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(MirrorError::Provider(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        if response_str.trim().is_empty() {
            return Err(MirrorError::Provider("Provider returned no response".into()));
        }

        let response: Response<R> = serde_json::from_str(response_str.trim())
            .map_err(|e| MirrorError::Provider(format!("Failed to parse response: {}", e)))?;

        match response {
            Response::Success { data } => Ok(data),
            Response::Error { error } => Err(MirrorError::Provider(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::protocol::ResolveCalendar;

    #[test]
    fn binary_is_named_after_provider() {
        assert_eq!(
            Provider::from_name("local").binary_name(),
            "busymirror-provider-local"
        );
    }

    #[tokio::test]
    async fn missing_binary_is_reported() {
        let provider = Provider::from_name("does-not-exist-anywhere");
        let err = provider
            .call(ResolveCalendar {
                remote_config: serde_json::Map::new(),
                account: "me".into(),
                calendar_name: "Calendar".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MirrorError::ProviderNotInstalled(_)));
    }
}
