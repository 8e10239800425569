//! Clients for the external record sources.
//!
//! Both clients are read-only and fully sequential: the only pacing applied
//! is the fixed inter-batch delay the E-utilities usage policy asks for.
//! There is no retry anywhere; every failure is terminal for its unit of
//! work and surfaced as a [`SourceError`].

mod clinicaltrials;
pub mod pubmed;

pub use clinicaltrials::ClinicalTrialsClient;
pub use pubmed::{PubMedClient, PubmedArticle};

/// Errors that can occur when talking to a record source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (XML or JSON)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Non-success response from the source
    #[error("API error: {0}")]
    Api(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}

impl From<quick_xml::DeError> for SourceError {
    fn from(err: quick_xml::DeError) -> Self {
        SourceError::Parse(format!("XML: {}", err))
    }
}
