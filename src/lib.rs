//! # Physician Profiler
//!
//! Batch harvester that builds per-physician profiles from two public
//! biomedical sources: the ClinicalTrials.gov v2 search API and the NCBI
//! E-utilities PubMed API. For every entry in an input roster it fetches the
//! matching records, flattens them into a consistent schema, computes
//! aggregate publication statistics, and upserts one document per physician
//! into MongoDB.
//!
//! ## Architecture
//!
//! - [`models`]: roster entries, trial documents, publication profiles
//! - [`sources`]: read-only clients for ClinicalTrials.gov and PubMed
//! - [`analysis`]: publication normalization and aggregate statistics
//! - [`store`]: upsert decision logic plus MongoDB and in-memory backends
//! - [`pipeline`]: sequential per-entry drivers and the failure report
//! - [`config`]: configuration management
//! - [`utils`]: HTTP client and JSON lookup helpers

pub mod analysis;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use models::{DoctorPublicationProfile, DoctorTrialsDocument, RosterEntry};
pub use pipeline::FailureReporter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
