//! Utility modules shared by both ingestion pipelines.
//!
//! - [`HttpClient`]: thin shared reqwest wrapper with sensible defaults
//! - [`json`]: safe nested-lookup helpers over `serde_json::Value`

mod http;
pub mod json;

pub use http::HttpClient;
