//! In-memory store backend for tests and dry runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{DoctorPublicationProfile, DoctorTrialsDocument, TrialRecord};
use crate::store::{ProfileStore, StoreError, TrialStore};

/// HashMap-backed implementation of both store traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    trials: Mutex<HashMap<String, DoctorTrialsDocument>>,
    profiles: Mutex<HashMap<String, DoctorPublicationProfile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored trials document for `record_id`, if any (test inspection)
    pub fn trials_document(&self, record_id: &str) -> Option<DoctorTrialsDocument> {
        self.trials
            .lock()
            .expect("memory store poisoned")
            .get(record_id)
            .cloned()
    }

    /// Stored publication profile for `record_id`, if any (test inspection)
    pub fn profile(&self, record_id: &str) -> Option<DoctorPublicationProfile> {
        self.profiles
            .lock()
            .expect("memory store poisoned")
            .get(record_id)
            .cloned()
    }

    /// Number of stored publication profiles
    pub fn profile_count(&self) -> usize {
        self.profiles.lock().expect("memory store poisoned").len()
    }
}

#[async_trait]
impl TrialStore for MemoryStore {
    async fn trial_ids(&self, record_id: &str) -> Result<Option<Vec<String>>, StoreError> {
        let trials = self.trials.lock().expect("memory store poisoned");
        Ok(trials.get(record_id).map(|doc| {
            doc.trials
                .iter()
                .filter_map(|t| t.overview.nct_id.clone())
                .collect()
        }))
    }

    async fn insert_document(&self, document: &DoctorTrialsDocument) -> Result<(), StoreError> {
        let mut trials = self.trials.lock().expect("memory store poisoned");
        trials.insert(document.record_id.clone(), document.clone());
        Ok(())
    }

    async fn push_trial(&self, record_id: &str, trial: &TrialRecord) -> Result<(), StoreError> {
        let mut trials = self.trials.lock().expect("memory store poisoned");
        let document = trials
            .get_mut(record_id)
            .ok_or_else(|| StoreError::Database(format!("no document for {}", record_id)))?;
        document.trials.push(trial.clone());
        Ok(())
    }

    async fn replace_trial(&self, record_id: &str, trial: &TrialRecord) -> Result<(), StoreError> {
        let mut trials = self.trials.lock().expect("memory store poisoned");
        let document = trials
            .get_mut(record_id)
            .ok_or_else(|| StoreError::Database(format!("no document for {}", record_id)))?;
        let slot = document
            .trials
            .iter_mut()
            .find(|t| t.overview.nct_id == trial.overview.nct_id)
            .ok_or_else(|| StoreError::Database("no matching trial to replace".to_string()))?;
        *slot = trial.clone();
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn save_profile(&self, profile: &DoctorPublicationProfile) -> Result<(), StoreError> {
        let mut profiles = self.profiles.lock().expect("memory store poisoned");
        profiles.insert(profile.record_id.clone(), profile.clone());
        Ok(())
    }
}
