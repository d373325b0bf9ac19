//! On-disk calendar files.
//!
//! One JSON array of events per calendar, at `<root>/<account>/<calendar>.json`.
//! The calendar id handed to busymirror is `<account>/<calendar>`.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use busymirror_core::connector::CalendarHandle;
use busymirror_core::event::RemoteEvent;

pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalStore { root: root.into() }
    }

    /// Handle for an existing calendar file, `None` when there is none.
    pub async fn resolve(&self, account: &str, calendar_name: &str) -> Result<Option<CalendarHandle>> {
        let id = calendar_id(account, calendar_name)?;
        if !tokio::fs::try_exists(self.path_for(&id)?).await? {
            return Ok(None);
        }

        Ok(Some(CalendarHandle {
            id,
            account: account.to_string(),
            name: calendar_name.to_string(),
        }))
    }

    pub async fn load(&self, calendar_id: &str) -> Result<Vec<RemoteEvent>> {
        let path = self.path_for(calendar_id)?;
        let contents = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Calendar '{}' not found at {}", calendar_id, path.display()))?;

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Replace the calendar's contents. Written to a sibling file first and
    /// renamed into place.
    pub async fn save(&self, calendar_id: &str, events: &[RemoteEvent]) -> Result<()> {
        let path = self.path_for(calendar_id)?;
        let json = serde_json::to_string_pretty(events)?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        Ok(())
    }

    fn path_for(&self, calendar_id: &str) -> Result<PathBuf> {
        let Some((account, name)) = calendar_id.split_once('/') else {
            bail!("Invalid calendar id '{}'", calendar_id);
        };
        check_segment(account)?;
        check_segment(name)?;

        Ok(self.root.join(account).join(format!("{name}.json")))
    }
}

pub fn calendar_id(account: &str, calendar_name: &str) -> Result<String> {
    check_segment(account)?;
    check_segment(calendar_name)?;
    Ok(format!("{account}/{calendar_name}"))
}

/// Account and calendar names become path components.
fn check_segment(segment: &str) -> Result<()> {
    if segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\'])
    {
        bail!("'{}' cannot be used as an account or calendar name", segment);
    }
    Ok(())
}
