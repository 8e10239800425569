//! Per-entry batch drivers and the failure report.
//!
//! Both pipelines share the same shape: walk the roster sequentially, run
//! one entry start to finish, record any failure and move on. Nothing a
//! single entry does can abort the batch.

pub mod publications;
pub mod trials;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::RosterEntry;
use crate::sources::SourceError;
use crate::store::StoreError;

/// Why one roster entry failed. Every failure is terminal for its entry;
/// there is no retry.
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    /// Network error or non-success response from a source
    #[error("{0}")]
    Transport(#[from] SourceError),

    /// Search or detail fetch yielded zero usable records
    #[error("{0}")]
    Empty(String),

    /// Anything unexpected during normalization, aggregation or persistence
    #[error("processing failed: {0}")]
    Processing(String),
}

impl From<StoreError> for EntryError {
    fn from(err: StoreError) -> Self {
        EntryError::Processing(err.to_string())
    }
}

/// One failed roster entry, as written to the failure report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    #[serde(rename = "Record_Id")]
    pub record_id: String,

    #[serde(rename = "Full_Name")]
    pub full_name: String,

    #[serde(rename = "Reason")]
    pub reason: String,
}

/// Errors writing the failure report
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Collects per-entry failures during a run and writes the report at the
/// end. Threaded explicitly through the drivers; ephemeral, never persisted
/// to the document store.
#[derive(Debug, Default)]
pub struct FailureReporter {
    failures: Vec<FailureRecord>,
}

impl FailureReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failed entry
    pub fn record(&mut self, entry: &RosterEntry, reason: impl Into<String>) {
        self.failures.push(FailureRecord {
            record_id: entry.record_id.clone(),
            full_name: entry.full_name.clone(),
            reason: reason.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn failures(&self) -> &[FailureRecord] {
        &self.failures
    }

    /// Write the CSV report. No failures means no file is written; returns
    /// whether one was.
    pub fn write_report(&self, path: &Path) -> Result<bool, ReportError> {
        if self.failures.is_empty() {
            return Ok(false);
        }

        let mut writer = csv::Writer::from_path(path)?;
        for failure in &self.failures {
            writer.serialize(failure)?;
        }
        writer.flush()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> RosterEntry {
        RosterEntry {
            record_id: "42".to_string(),
            full_name: "Jane Doe".to_string(),
        }
    }

    #[test]
    fn no_failures_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failed.csv");

        let reporter = FailureReporter::new();
        assert!(!reporter.write_report(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn failures_are_written_with_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failed.csv");

        let mut reporter = FailureReporter::new();
        reporter.record(&entry(), "No studies found");
        assert!(reporter.write_report(&path).unwrap());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Record_Id,Full_Name,Reason"));
        assert!(contents.contains("42,Jane Doe,No studies found"));
    }

    #[test]
    fn entry_error_messages_are_human_readable() {
        let empty = EntryError::Empty("No studies found".to_string());
        assert_eq!(empty.to_string(), "No studies found");

        let transport = EntryError::Transport(SourceError::Api("status 500".to_string()));
        assert_eq!(transport.to_string(), "API error: status 500");
    }
}
