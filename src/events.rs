//! Event logging subsystem for patchport.
//!
//! Batch runs append their progress to an NDJSON log (one JSON object per
//! line) at `<output>/.patchport/events.ndjson`, so interrupted or timed-out
//! runs leave an auditable record of which files were converted, which
//! failed, and which were abandoned in flight.
//!
//! # Event Format
//!
//! Each event is a JSON object with the following fields:
//! - `ts`: RFC3339 timestamp
//! - `action`: The action performed (batch_started, file_converted, etc.)
//! - `actor`: The owner string (e.g., `user@HOST`)
//! - `file`: Optional path for file-specific events
//! - `details`: Freeform object with action-specific details

use crate::error::{PortError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Batch run started
    BatchStarted,
    /// Single file converted successfully
    FileConverted,
    /// Single file failed and was skipped
    FileFailed,
    /// File still in flight when the batch deadline hit
    FileUnfinished,
    /// Batch run finished (with or without failures)
    BatchFinished,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::BatchStarted => write!(f, "batch_started"),
            EventAction::FileConverted => write!(f, "file_converted"),
            EventAction::FileFailed => write!(f, "file_failed"),
            EventAction::FileUnfinished => write!(f, "file_unfinished"),
            EventAction::BatchFinished => write!(f, "batch_finished"),
        }
    }
}

/// An event record for the audit log.
///
/// Events are serialized as single-line JSON objects and appended to
/// the events.ndjson file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// The action that was performed.
    pub action: EventAction,

    /// The actor who performed the action (e.g., `user@HOST`).
    pub actor: String,

    /// Optional file path for file-specific events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Freeform details object with action-specific information.
    pub details: Value,
}

impl Event {
    /// Create a new event with the given action.
    ///
    /// The timestamp is set to the current time, and the actor is
    /// determined from the environment (USER@HOSTNAME).
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: actor_string(),
            file: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the file path for this event.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| PortError::User(format!("failed to serialize event to JSON: {}", e)))
    }
}

/// Get the actor string for event metadata.
fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append-only event log rooted at an output directory.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    /// Log living at `<output>/.patchport/events.ndjson`.
    pub fn for_output_dir(output: impl AsRef<Path>) -> Self {
        EventLog {
            path: output.as_ref().join(".patchport").join("events.ndjson"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an event as a single JSON line, creating the log (and its
    /// directory) on first use. Each append is flushed to disk before
    /// returning.
    pub fn append(&self, event: &Event) -> Result<()> {
        let json_line = event.to_ndjson_line()?;

        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| PortError::io(parent, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PortError::io(&self.path, e))?;

        writeln!(file, "{}", json_line).map_err(|e| PortError::io(&self.path, e))?;
        file.sync_all().map_err(|e| PortError::io(&self.path, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn event_creation() {
        let event = Event::new(EventAction::BatchStarted);

        assert_eq!(event.action, EventAction::BatchStarted);
        assert!(!event.actor.is_empty());
        assert!(event.file.is_none());
        let age = Utc::now().signed_duration_since(event.ts);
        assert!(age.num_minutes() < 1);
    }

    #[test]
    fn event_serialization_round_trips() {
        let event = Event::new(EventAction::FileConverted)
            .with_file("0001-rename.patch")
            .with_details(json!({"elapsed_ms": 12}));

        let json_line = event.to_ndjson_line().unwrap();
        assert!(!json_line.contains('\n'));

        let parsed: Event = serde_json::from_str(&json_line).unwrap();
        assert_eq!(parsed.action, EventAction::FileConverted);
        assert_eq!(parsed.file, Some("0001-rename.patch".to_string()));
        assert_eq!(parsed.details["elapsed_ms"], 12);
    }

    #[test]
    fn event_action_serializes_to_snake_case() {
        let event = Event::new(EventAction::FileUnfinished);
        let json_line = event.to_ndjson_line().unwrap();
        assert!(json_line.contains("\"file_unfinished\""));
    }

    #[test]
    fn event_without_file_omits_field() {
        let event = Event::new(EventAction::BatchStarted);
        let json_line = event.to_ndjson_line().unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json_line).unwrap();
        assert!(parsed.get("file").is_none());
    }

    #[test]
    fn append_creates_log_and_directory() {
        let dir = TempDir::new().unwrap();
        let log = EventLog::for_output_dir(dir.path());
        assert!(!log.path().exists());

        log.append(&Event::new(EventAction::BatchStarted)).unwrap();
        log.append(
            &Event::new(EventAction::FileFailed)
                .with_file("bad.patch")
                .with_details(json!({"error": "parse error"})),
        )
        .unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        assert!(content.ends_with('\n'));
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: Event = serde_json::from_str(lines[0]).unwrap();
        let second: Event = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(first.action, EventAction::BatchStarted);
        assert_eq!(second.action, EventAction::FileFailed);
        assert_eq!(second.file, Some("bad.patch".to_string()));
    }

    #[test]
    fn actor_string_has_user_and_host() {
        let actor = actor_string();
        assert!(actor.contains('@'));
    }

    #[test]
    fn action_display_matches_wire_form() {
        assert_eq!(format!("{}", EventAction::BatchStarted), "batch_started");
        assert_eq!(format!("{}", EventAction::FileConverted), "file_converted");
        assert_eq!(format!("{}", EventAction::BatchFinished), "batch_finished");
    }
}
