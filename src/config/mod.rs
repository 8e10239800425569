//! Configuration management.
//!
//! Settings come from an optional TOML file plus `PROFILER_`-prefixed
//! environment variables (`PROFILER_MONGO__URI=...`); every field has a
//! default matching the public API limits, so a bare run works out of the
//! box against localhost.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Document store connection
    #[serde(default)]
    pub mongo: MongoSettings,

    /// PubMed E-utilities limits
    #[serde(default)]
    pub pubmed: PubMedSettings,

    /// ClinicalTrials.gov pagination limits
    #[serde(default)]
    pub trials: TrialsSettings,

    /// Failure report output
    #[serde(default)]
    pub report: ReportSettings,
}

impl Settings {
    /// Load settings from an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(Environment::with_prefix("PROFILER").separator("__"));
        builder.build()?.try_deserialize()
    }
}

/// MongoDB connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSettings {
    #[serde(default = "default_mongo_uri")]
    pub uri: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_trials_collection")]
    pub trials_collection: String,

    #[serde(default = "default_publications_collection")]
    pub publications_collection: String,
}

impl Default for MongoSettings {
    fn default() -> Self {
        Self {
            uri: default_mongo_uri(),
            database: default_database(),
            trials_collection: default_trials_collection(),
            publications_collection: default_publications_collection(),
        }
    }
}

fn default_mongo_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "derma".to_string()
}

fn default_trials_collection() -> String {
    "clinical".to_string()
}

fn default_publications_collection() -> String {
    "pubmed".to_string()
}

/// PubMed E-utilities settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubMedSettings {
    /// Result cap for one esearch call; there is no pagination loop
    #[serde(default = "default_retmax")]
    pub retmax: usize,

    /// Ids per efetch/elink request; values below 1 are treated as 1
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Delay between detail/citation batches
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Reserved: affiliation filter for the author search. Accepted but not
    /// yet composed into the query.
    #[serde(default)]
    pub affiliation: Option<String>,
}

impl Default for PubMedSettings {
    fn default() -> Self {
        Self {
            retmax: default_retmax(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            affiliation: None,
        }
    }
}

fn default_retmax() -> usize {
    5000
}

fn default_batch_size() -> usize {
    200
}

fn default_batch_delay_ms() -> u64 {
    340
}

/// ClinicalTrials.gov search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialsSettings {
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Default for TrialsSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_pages: default_max_pages(),
        }
    }
}

fn default_page_size() -> usize {
    100
}

fn default_max_pages() -> usize {
    100
}

/// Failure report settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Where the failure report is written when any entry fails
    #[serde(default = "default_failure_report")]
    pub failure_report: PathBuf,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            failure_report: default_failure_report(),
        }
    }
}

fn default_failure_report() -> PathBuf {
    PathBuf::from("failed_searches.csv")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_api_limits() {
        let settings = Settings::default();
        assert_eq!(settings.pubmed.retmax, 5000);
        assert_eq!(settings.pubmed.batch_size, 200);
        assert_eq!(settings.pubmed.batch_delay_ms, 340);
        assert_eq!(settings.trials.page_size, 100);
        assert_eq!(settings.trials.max_pages, 100);
        assert_eq!(settings.mongo.database, "derma");
        assert!(settings.pubmed.affiliation.is_none());
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.mongo.trials_collection, "clinical");
        assert_eq!(settings.mongo.publications_collection, "pubmed");
    }
}
