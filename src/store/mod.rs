//! Document-store seam: upsert decision logic plus backends.
//!
//! The append-vs-replace decision for trials is core logic and lives here in
//! [`upsert_trial`]; the traits keep the storage backend swappable (MongoDB
//! in production, [`MemoryStore`] in tests).

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use async_trait::async_trait;

use crate::models::{DoctorPublicationProfile, DoctorTrialsDocument, RosterEntry, TrialRecord};

/// Errors from the document store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// A trial reached the store without an NCT id (callers filter these out)
    #[error("trial record has no NCT id")]
    MissingTrialId,
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// What [`upsert_trial`] decided to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No document existed; created one holding this single trial
    Inserted,
    /// Document existed, NCT id was new; appended
    Appended,
    /// NCT id already present; replaced that entry in place
    Updated,
}

/// Primitive operations the trial upsert needs from a backend.
#[async_trait]
pub trait TrialStore: Send + Sync {
    /// NCT ids currently stored for `record_id`, or `None` if no document
    /// exists for that identifier yet.
    async fn trial_ids(&self, record_id: &str) -> Result<Option<Vec<String>>, StoreError>;

    /// Create the per-physician document
    async fn insert_document(&self, document: &DoctorTrialsDocument) -> Result<(), StoreError>;

    /// Append a trial to an existing document
    async fn push_trial(&self, record_id: &str, trial: &TrialRecord) -> Result<(), StoreError>;

    /// Replace the trial matching this trial's NCT id in place
    async fn replace_trial(&self, record_id: &str, trial: &TrialRecord) -> Result<(), StoreError>;
}

/// Whole-profile overwrite storage for publication profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Upsert the profile keyed by its record id, replacing any prior one
    async fn save_profile(&self, profile: &DoctorPublicationProfile) -> Result<(), StoreError>;
}

/// Upsert one trial into the physician's document.
///
/// Guarantees the invariant that a given NCT id appears at most once per
/// document: no document means insert, unseen NCT id means append, and a
/// re-encountered NCT id replaces the stored entry rather than duplicating
/// it.
pub async fn upsert_trial(
    store: &dyn TrialStore,
    entry: &RosterEntry,
    trial: TrialRecord,
) -> Result<UpsertOutcome, StoreError> {
    let nct_id = trial
        .overview
        .nct_id
        .clone()
        .ok_or(StoreError::MissingTrialId)?;

    match store.trial_ids(&entry.record_id).await? {
        None => {
            let document = DoctorTrialsDocument {
                record_id: entry.record_id.clone(),
                full_name: entry.full_name.clone(),
                trials: vec![trial],
            };
            store.insert_document(&document).await?;
            Ok(UpsertOutcome::Inserted)
        }
        Some(existing) if existing.contains(&nct_id) => {
            store.replace_trial(&entry.record_id, &trial).await?;
            Ok(UpsertOutcome::Updated)
        }
        Some(_) => {
            store.push_trial(&entry.record_id, &trial).await?;
            Ok(UpsertOutcome::Appended)
        }
    }
}
