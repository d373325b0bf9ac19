//! busymirror configuration.
//!
//! Read from `~/.config/busymirror/config.toml`, then overridden by
//! `BUSYMIRROR_*` environment variables (`__` separates nested keys, e.g.
//! `BUSYMIRROR_SOURCE__ACCOUNT`). Callers apply CLI flags on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Duration;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_WINDOW_DAYS;
use crate::error::{MirrorError, MirrorResult};
use crate::remote::provider::Provider;
use crate::remote::{Remote, RemoteConfig};
use crate::report::Side;
use crate::sync::SyncRequest;
use crate::window::SyncWindow;

static DEFAULT_CALENDAR_NAME: &str = "Calendar";
static DEFAULT_PROVIDER: &str = "local";

fn default_calendar_name() -> String {
    DEFAULT_CALENDAR_NAME.to_string()
}

fn default_window() -> String {
    format!("{}days", DEFAULT_WINDOW_DAYS)
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

/// One side of the sync: which provider to call and as whom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// Everything else is handed to the provider untouched
    #[serde(flatten)]
    pub params: HashMap<String, toml::Value>,
}

impl Default for AccountConfig {
    fn default() -> Self {
        AccountConfig {
            provider: default_provider(),
            account: None,
            params: HashMap::new(),
        }
    }
}

impl AccountConfig {
    pub fn remote(&self) -> Remote {
        Remote::new(
            Provider::from_name(&self.provider),
            RemoteConfig(self.params.clone()),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Calendar name shared by both accounts
    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,

    /// Window length as a humantime duration ("30days", "2weeks")
    #[serde(default = "default_window")]
    pub window: String,

    #[serde(default)]
    pub source: AccountConfig,

    #[serde(default)]
    pub target: AccountConfig,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        MirrorConfig {
            calendar_name: default_calendar_name(),
            window: default_window(),
            source: AccountConfig::default(),
            target: AccountConfig::default(),
        }
    }
}

impl MirrorConfig {
    pub fn config_path() -> MirrorResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| MirrorError::Config("Could not determine config directory".into()))?
            .join("busymirror");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`, which must exist, or from the default location
    /// (creating a commented template there on first use).
    pub fn load(path: Option<&Path>) -> MirrorResult<Self> {
        let explicit = path.is_some();
        let path = match path {
            Some(p) => PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).into_owned()),
            None => {
                let p = Self::config_path()?;
                if !p.exists() {
                    Self::create_default_config(&p)?;
                }
                p
            }
        };

        Config::builder()
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Toml).required(explicit))
            .add_source(
                Environment::with_prefix("BUSYMIRROR")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| MirrorError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| MirrorError::Config(e.to_string()))
    }

    /// The configured window length. Must be positive.
    pub fn window_length(&self) -> MirrorResult<Duration> {
        let std_duration = humantime::parse_duration(&self.window).map_err(|e| {
            MirrorError::Config(format!("Invalid window '{}': {}", self.window, e))
        })?;
        let length = Duration::from_std(std_duration)
            .map_err(|e| MirrorError::Config(format!("Window '{}' is too long: {}", self.window, e)))?;

        if length <= Duration::zero() {
            return Err(MirrorError::Config(format!(
                "Window '{}' must be longer than zero",
                self.window
            )));
        }
        Ok(length)
    }

    /// Everything one run needs, with the window anchored at the current
    /// instant.
    pub fn sync_request(&self) -> MirrorResult<SyncRequest> {
        Ok(SyncRequest {
            source_account: required_account(&self.source, Side::Source)?,
            target_account: required_account(&self.target, Side::Target)?,
            calendar_name: self.calendar_name.clone(),
            window: SyncWindow::from_now(self.window_length()?)?,
        })
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> MirrorResult<()> {
        let contents = format!(
            "\
# busymirror configuration

# Calendar name used on both accounts:
# calendar_name = \"{}\"

# How far ahead to mirror:
# window = \"{}\"

# [source]
# provider = \"{}\"
# account = \"user@workemail.com\"

# [target]
# provider = \"{}\"
# account = \"user@personalemail.com\"
",
            DEFAULT_CALENDAR_NAME,
            default_window(),
            DEFAULT_PROVIDER,
            DEFAULT_PROVIDER
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MirrorError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| MirrorError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

fn required_account(config: &AccountConfig, side: Side) -> MirrorResult<String> {
    config
        .account
        .clone()
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| {
            MirrorError::Config(format!(
                "No {side} account configured. Set `{side}.account` in the config file or pass --{side}-account"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_accounts_and_forwards_extra_keys() {
        let (_dir, path) = write_config(
            r#"
calendar_name = "Agenda"
window = "2weeks"

[source]
provider = "local"
account = "work@example.com"
local_root = "/tmp/cals"

[target]
account = "home@example.com"
"#,
        );

        let cfg = MirrorConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.calendar_name, "Agenda");
        assert_eq!(cfg.window_length().unwrap(), Duration::days(14));
        assert_eq!(cfg.source.account.as_deref(), Some("work@example.com"));
        assert_eq!(
            cfg.source.params.get("local_root").and_then(|v| v.as_str()),
            Some("/tmp/cals")
        );
        assert_eq!(cfg.target.provider, "local");
        assert_eq!(cfg.target.account.as_deref(), Some("home@example.com"));
    }

    #[test]
    fn defaults_apply_when_file_is_empty() {
        let (_dir, path) = write_config("");
        let cfg = MirrorConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.calendar_name, "Calendar");
        assert_eq!(cfg.window_length().unwrap(), Duration::days(30));
    }

    #[test]
    fn missing_account_is_a_config_error() {
        let cfg = MirrorConfig {
            target: AccountConfig {
                account: Some("home@example.com".into()),
                ..AccountConfig::default()
            },
            ..MirrorConfig::default()
        };
        let err = cfg.sync_request().unwrap_err();
        assert!(err.to_string().contains("source account"));
    }

    #[test]
    fn zero_and_garbage_windows_are_rejected() {
        let mut cfg = MirrorConfig::default();
        cfg.window = "0s".into();
        assert!(cfg.window_length().is_err());
        cfg.window = "a fortnight".into();
        assert!(cfg.window_length().is_err());
    }

    #[test]
    fn request_window_uses_configured_length() {
        let cfg = MirrorConfig {
            window: "7days".into(),
            source: AccountConfig {
                account: Some("work@example.com".into()),
                ..AccountConfig::default()
            },
            target: AccountConfig {
                account: Some("home@example.com".into()),
                ..AccountConfig::default()
            },
            ..MirrorConfig::default()
        };
        let request = cfg.sync_request().unwrap();
        assert_eq!(request.window.end() - request.window.start(), Duration::days(7));
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = MirrorConfig::load(Some(&dir.path().join("typo.toml"))).unwrap_err();
        assert!(matches!(err, MirrorError::Config(_)));
    }

    #[test]
    fn window_beyond_calendar_range_is_a_config_error() {
        let cfg = MirrorConfig {
            window: "300000years".into(),
            source: AccountConfig {
                account: Some("work@example.com".into()),
                ..AccountConfig::default()
            },
            target: AccountConfig {
                account: Some("home@example.com".into()),
                ..AccountConfig::default()
            },
            ..MirrorConfig::default()
        };
        let err = cfg.sync_request().unwrap_err();
        assert!(matches!(err, MirrorError::Config(_)));
    }

    #[test]
    fn default_template_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        MirrorConfig::create_default_config(&path).unwrap();
        let cfg = MirrorConfig::load(Some(&path)).unwrap();
        assert!(cfg.source.account.is_none());
    }
}
