//! Write-only record of every agent call, kept apart from tracing output so a
//! run's prompts and replies can be inspected afterwards.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Analysis,
    Fix,
    Debug,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub agent_name: String,
    pub model_used: String,
    pub action: ActionKind,
    pub details: serde_json::Value,
    /// `SUCCESS`, `FAILURE`, or the Judge's verdict.
    pub status: String,
}

impl Interaction {
    pub fn new(
        agent_name: &str,
        model_used: &str,
        action: ActionKind,
        details: serde_json::Value,
        status: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            agent_name: agent_name.to_string(),
            model_used: model_used.to_string(),
            action,
            details,
            status: status.to_string(),
        }
    }
}

/// Fire-and-forget sink. Implementations must not fail the caller.
#[async_trait]
pub trait InteractionLog: Send + Sync {
    async fn record(&self, interaction: Interaction);
}

/// Keeps the whole log as a JSON array on disk, rewritten on every record.
pub struct JsonFileLog {
    path: PathBuf,
    entries: Mutex<Vec<Interaction>>,
}

impl JsonFileLog {
    /// Open (or start) the log at `path`. An unreadable existing file is
    /// replaced rather than treated as fatal.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let entries = match tokio::fs::read_to_string(path).await {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Discarding unreadable interaction log");
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn save(&self, entries: &[Interaction]) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl InteractionLog for JsonFileLog {
    /// The lock is held across the write so concurrent records land in order.
    async fn record(&self, interaction: Interaction) {
        let mut entries = self.entries.lock().await;
        entries.push(interaction);

        if let Err(e) = self.save(&entries).await {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to write interaction log");
        }
    }
}
