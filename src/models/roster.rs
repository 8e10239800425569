//! Roster input: the list of physicians to profile.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// One physician to process, as read from the input roster.
///
/// The roster is the source of truth for the external record identifier and
/// the exact name used for both searches; entries are immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// External record identifier (unique key in the document store)
    #[serde(rename = "Record_Id")]
    pub record_id: String,

    /// Full name used as the search term
    #[serde(rename = "Full_Name")]
    pub full_name: String,
}

/// Errors reading the roster file
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read roster: {0}")]
    Csv(#[from] csv::Error),

    #[error("roster contains no entries")]
    Empty,
}

/// Read the roster CSV. Requires `Record_Id` and `Full_Name` columns;
/// whitespace around values is trimmed.
pub fn read_roster(path: &Path) -> Result<Vec<RosterEntry>, RosterError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;

    let mut entries = Vec::new();
    for record in reader.deserialize::<RosterEntry>() {
        entries.push(record?);
    }

    if entries.is_empty() {
        return Err(RosterError::Empty);
    }
    Ok(entries)
}
