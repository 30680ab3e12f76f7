//! Date-keyed history store
//!
//! Durably records every successful sample, queryable by calendar date. The
//! whole history lives in one JSON document: an object keyed by "YYYY-MM-DD",
//! each value an ordered array of `{time, temp, hum}` entries. Every append
//! deserializes the document, pushes one entry, and rewrites the file — O(total
//! entries) in time and transient memory. That is a deliberate tradeoff for a
//! single device sampling every couple of seconds and queried by a human; it
//! is not a format for high-frequency or long-retention telemetry. There is no
//! rotation or expiry: the document grows without bound, and no schema version
//! field exists, so a format change means migrating or losing prior history.
//!
//! A document that is missing, unparsable, or unreadable self-heals to an
//! empty one (prior history is lost in the corrupt case — accepted). The load
//! outcome is named via [`DocumentStatus`] so the self-healing path stays
//! observable and testable instead of being silently folded into "empty".

use crate::error::{Result, StationError};
use crate::sensor::Measurement;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// One persisted sample within a day, in wire field names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Time of day, "HH:MM"
    pub time: String,

    /// Temperature in degrees Celsius
    pub temp: f64,

    /// Relative humidity in percent
    pub hum: f64,
}

/// Full persisted document: date key -> chronological entries
pub type HistoryDocument = BTreeMap<String, Vec<HistoryEntry>>;

/// How the persisted document was obtained on load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    /// Parsed from the durable copy
    Loaded,

    /// No durable copy exists yet; started empty
    Absent,

    /// Durable copy exists but does not parse; started empty, prior history lost
    Corrupt,

    /// Storage medium refused the read; started empty for this operation
    Unreadable,
}

/// Result of a query-by-date
#[derive(Debug, Clone, PartialEq)]
pub struct DayQuery {
    /// Entries for the requested date, chronological; empty for unknown dates
    pub entries: Vec<HistoryEntry>,

    /// Load outcome behind this answer. HTTP callers see only `entries`;
    /// "no data for that day" and "store unreadable" are indistinguishable
    /// there by design.
    pub status: DocumentStatus,
}

/// Durable date-keyed append-only log backed by a single JSON document
pub struct HistoryStore {
    path: PathBuf,

    /// Serializes every load-mutate-store sequence. The underlying medium
    /// gives no transactional guarantees, so exactly one mutation may be in
    /// flight at a time.
    doc_lock: Mutex<()>,
}

impl HistoryStore {
    /// Create a store over the given document path. The document itself is
    /// lazily created on first append.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            doc_lock: Mutex::new(()),
        }
    }

    /// Path of the durable document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one measurement under the given date key.
    ///
    /// A missing or corrupt document self-heals to empty before the append;
    /// only a failed write of the new document surfaces as an error, and
    /// callers are expected to log it rather than escalate — the in-memory
    /// cache keeps serving even with persistence broken.
    pub async fn append(
        &self,
        date_key: &str,
        time_of_day: &str,
        measurement: Measurement,
    ) -> Result<()> {
        let _guard = self.doc_lock.lock().await;

        let (mut document, status) = self.load().await;
        if status == DocumentStatus::Corrupt {
            warn!(
                path = %self.path.display(),
                "History document was corrupt; starting fresh, prior history lost"
            );
        }

        let entries = document.entry(date_key.to_string()).or_default();
        entries.push(HistoryEntry {
            time: time_of_day.to_string(),
            temp: measurement.temperature,
            hum: measurement.humidity,
        });
        debug!(
            date_key,
            time_of_day,
            entries_for_day = entries.len(),
            "Appending history entry"
        );

        self.persist(&document).await
    }

    /// Entries recorded under the given date key.
    ///
    /// Unknown dates and unreadable stores both yield an empty entry list;
    /// the status field says which it was.
    pub async fn query(&self, date_key: &str) -> DayQuery {
        let _guard = self.doc_lock.lock().await;

        let (document, status) = self.load().await;
        let entries = document.get(date_key).cloned().unwrap_or_default();

        DayQuery { entries, status }
    }

    /// Load the durable document, degrading to empty on any failure
    async fn load(&self) -> (HistoryDocument, DocumentStatus) {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return (HistoryDocument::new(), DocumentStatus::Absent);
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "History document unreadable");
                return (HistoryDocument::new(), DocumentStatus::Unreadable);
            }
        };

        match serde_json::from_str(&contents) {
            Ok(document) => (document, DocumentStatus::Loaded),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "History document unparsable");
                (HistoryDocument::new(), DocumentStatus::Corrupt)
            }
        }
    }

    /// Rewrite the durable copy. Write-then-rename so a crash mid-write
    /// leaves the previous document intact.
    async fn persist(&self, document: &HistoryDocument) -> Result<()> {
        let json = serde_json::to_string(document)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StationError::storage(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &json)
            .await
            .map_err(|e| StationError::storage(format!("failed to write document: {e}")))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StationError::storage(format!("failed to replace document: {e}")))?;

        Ok(())
    }
}
