//! Local-provider remote configuration.
//!
//! Typed view of the keys busymirror forwards from the account's config
//! table. busymirror-core itself stays provider-agnostic.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalRemoteConfig {
    /// Directory holding `<account>/<calendar>.json` files
    pub local_root: Option<String>,
}

impl LocalRemoteConfig {
    /// The configured root with `~` and `$VARS` expanded, or the platform
    /// data directory.
    pub fn root(&self) -> Result<PathBuf> {
        match &self.local_root {
            Some(raw) => {
                let expanded = shellexpand::full(raw)
                    .map_err(|e| anyhow!("Invalid local_root '{}': {}", raw, e))?;
                Ok(PathBuf::from(expanded.into_owned()))
            }
            None => dirs::data_dir()
                .map(|dir| dir.join("busymirror"))
                .ok_or_else(|| anyhow!("Could not determine data directory")),
        }
    }
}

impl TryFrom<&serde_json::Map<String, serde_json::Value>> for LocalRemoteConfig {
    type Error = anyhow::Error;

    fn try_from(map: &serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        let local_root = match map.get("local_root") {
            None | Some(serde_json::Value::Null) => None,
            Some(value) => Some(
                value
                    .as_str()
                    .ok_or_else(|| anyhow!("local_root must be a string"))?
                    .to_string(),
            ),
        };

        Ok(Self { local_root })
    }
}
