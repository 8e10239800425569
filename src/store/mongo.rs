//! MongoDB store backend.

use async_trait::async_trait;
use mongodb::bson::{doc, to_bson, to_document};
use mongodb::options::{IndexOptions, UpdateOptions};
use mongodb::{Client, Collection, IndexModel};

use crate::config::MongoSettings;
use crate::models::{DoctorPublicationProfile, DoctorTrialsDocument, TrialRecord};
use crate::store::{ProfileStore, StoreError, TrialStore};

/// MongoDB-backed implementation of both store traits.
///
/// Trials use the positional `$` update so the replace targets the array
/// element matched by NCT id; profiles are plain overwrite upserts.
#[derive(Debug, Clone)]
pub struct MongoStore {
    trials: Collection<DoctorTrialsDocument>,
    profiles: Collection<DoctorPublicationProfile>,
}

impl MongoStore {
    /// Connect and bind the two collections.
    pub async fn connect(settings: &MongoSettings) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(&settings.uri).await?;
        let database = client.database(&settings.database);
        Ok(Self {
            trials: database.collection(&settings.trials_collection),
            profiles: database.collection(&settings.publications_collection),
        })
    }

    /// Create the uniqueness and array-lookup indexes on the trials
    /// collection. Idempotent; safe to call on every run.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let unique_record = IndexModel::builder()
            .keys(doc! { "record_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("unique_record_id".to_string())
                    .build(),
            )
            .build();
        self.trials.create_index(unique_record, None).await?;

        let record_trial = IndexModel::builder()
            .keys(doc! { "record_id": 1, "trials.overview.nct_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("record_trial_index".to_string())
                    .build(),
            )
            .build();
        self.trials.create_index(record_trial, None).await?;

        Ok(())
    }
}

#[async_trait]
impl TrialStore for MongoStore {
    async fn trial_ids(&self, record_id: &str) -> Result<Option<Vec<String>>, StoreError> {
        let document = self
            .trials
            .find_one(doc! { "record_id": record_id }, None)
            .await?;
        Ok(document.map(|doc| {
            doc.trials
                .iter()
                .filter_map(|t| t.overview.nct_id.clone())
                .collect()
        }))
    }

    async fn insert_document(&self, document: &DoctorTrialsDocument) -> Result<(), StoreError> {
        self.trials.insert_one(document, None).await?;
        Ok(())
    }

    async fn push_trial(&self, record_id: &str, trial: &TrialRecord) -> Result<(), StoreError> {
        self.trials
            .update_one(
                doc! { "record_id": record_id },
                doc! { "$push": { "trials": to_bson(trial)? } },
                None,
            )
            .await?;
        Ok(())
    }

    async fn replace_trial(&self, record_id: &str, trial: &TrialRecord) -> Result<(), StoreError> {
        let nct_id = trial
            .overview
            .nct_id
            .as_deref()
            .ok_or(StoreError::MissingTrialId)?;
        self.trials
            .update_one(
                doc! { "record_id": record_id, "trials.overview.nct_id": nct_id },
                doc! { "$set": {
                    "trials.$.overview": to_bson(&trial.overview)?,
                    "trials.$.raw": to_bson(&trial.raw)?,
                } },
                None,
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MongoStore {
    async fn save_profile(&self, profile: &DoctorPublicationProfile) -> Result<(), StoreError> {
        let options = UpdateOptions::builder().upsert(true).build();
        self.profiles
            .update_one(
                doc! { "record_id": profile.record_id.as_str() },
                doc! { "$set": to_document(profile)? },
                options,
            )
            .await?;
        Ok(())
    }
}
