//! Append-only persistence for tickets and events.
//!
//! Two JSONL logs live under the data directory: `tickets.jsonl` (full
//! ticket snapshots) and `events.jsonl` (one record per engine decision
//! point). Records are written as a single buffered append each, are never
//! edited or deleted, and the latest snapshot for a ticket id wins on read.
//! The orchestrator treats this store as a fire-alongside collaborator:
//! a failed append never changes a gate or transition decision.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::StagegateError;
use crate::fsm::State;
use crate::ticket::Ticket;

/// One event record in `events.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub run_id: String,
    pub event_type: String,
    pub state: State,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub details: Value,
}

/// Store for persisting tickets and events.
pub struct ArtifactStore {
    tickets_file: PathBuf,
    events_file: PathBuf,
}

impl ArtifactStore {
    /// Open (creating if needed) a store rooted at `data_dir`.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StagegateError> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;
        info!(dir = %data_dir.display(), "artifact store opened");
        Ok(Self {
            tickets_file: data_dir.join("tickets.jsonl"),
            events_file: data_dir.join("events.jsonl"),
        })
    }

    /// Append a full ticket snapshot, tagged with the save time.
    pub fn save_ticket(&self, ticket: &Ticket) -> Result<(), StagegateError> {
        let mut record = serde_json::to_value(ticket)?;
        if let Some(obj) = record.as_object_mut() {
            obj.insert("_saved_at".into(), Value::String(Utc::now().to_rfc3339()));
        }
        self.append_line(&self.tickets_file, &record)?;
        info!(ticket_id = %ticket.ticket_id, state = %ticket.state, "ticket saved");
        Ok(())
    }

    /// Latest snapshot for `ticket_id`, or `None` if never saved.
    ///
    /// Corrupt lines are skipped; the log keeps scanning so one bad record
    /// cannot hide later snapshots.
    pub fn get_ticket(&self, ticket_id: &str) -> Result<Option<Ticket>, StagegateError> {
        if !self.tickets_file.exists() {
            return Ok(None);
        }

        let reader = BufReader::new(fs::File::open(&self.tickets_file)?);
        let mut latest: Option<Value> = None;
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let Ok(mut record) = serde_json::from_str::<Value>(&line) else {
                continue;
            };
            if record.get("ticket_id").and_then(Value::as_str) == Some(ticket_id) {
                if let Some(obj) = record.as_object_mut() {
                    obj.remove("_saved_at");
                }
                latest = Some(record);
            }
        }

        match latest {
            Some(record) => Ok(Some(serde_json::from_value(record)?)),
            None => Ok(None),
        }
    }

    /// Append one event record with a timestamp.
    pub fn save_event(
        &self,
        run_id: &str,
        event_type: &str,
        state: State,
        details: Value,
    ) -> Result<(), StagegateError> {
        let event = EventRecord {
            run_id: run_id.to_string(),
            event_type: event_type.to_string(),
            state,
            timestamp: Utc::now(),
            details,
        };
        self.append_line(&self.events_file, &serde_json::to_value(&event)?)?;
        info!(run_id, event_type, state = %state, "event saved");
        Ok(())
    }

    /// All events recorded for a run, in append order.
    pub fn events_for_run(&self, run_id: &str) -> Result<Vec<EventRecord>, StagegateError> {
        if !self.events_file.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(fs::File::open(&self.events_file)?);
        let mut events = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let Ok(event) = serde_json::from_str::<EventRecord>(&line) else {
                continue;
            };
            if event.run_id == run_id {
                events.push(event);
            }
        }
        Ok(events)
    }

    // One record per line; the full line is buffered and flushed in a single
    // write so concurrent appends cannot interleave within a record.
    fn append_line(&self, path: &Path, record: &Value) -> Result<(), StagegateError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}
