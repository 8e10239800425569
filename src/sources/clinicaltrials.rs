//! ClinicalTrials.gov v2 study search client.

use serde::Deserialize;
use serde_json::Value;

use crate::config::TrialsSettings;
use crate::sources::SourceError;
use crate::utils::HttpClient;

const CLINICALTRIALS_BASE_URL: &str = "https://clinicaltrials.gov/api/v2";

/// One page of the `/studies` search response
#[derive(Debug, Deserialize)]
struct StudiesPage {
    #[serde(default)]
    studies: Vec<Value>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

/// Client for the ClinicalTrials.gov v2 search API.
///
/// Search results are paginated with an opaque continuation token; the
/// client follows it until the API stops returning one or the page cap is
/// reached.
#[derive(Debug, Clone)]
pub struct ClinicalTrialsClient {
    client: HttpClient,
    base_url: String,
    page_size: usize,
    max_pages: usize,
}

impl ClinicalTrialsClient {
    /// Create a new client against the public API
    pub fn new(settings: &TrialsSettings) -> Self {
        Self {
            client: HttpClient::new(),
            base_url: CLINICALTRIALS_BASE_URL.to_string(),
            page_size: settings.page_size,
            max_pages: settings.max_pages,
        }
    }

    /// Point the client at a different base URL (for testing)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Search studies matching `term` (the physician's full name), following
    /// pagination tokens. Returns the raw study payloads.
    ///
    /// An empty first page returns `Ok(vec![])`: "no results" is not a
    /// transport failure. An empty later page just ends pagination.
    pub async fn search_studies(&self, term: &str) -> Result<Vec<Value>, SourceError> {
        let url = format!("{}/studies", self.base_url);
        let mut studies = Vec::new();
        let mut page_token: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            let mut params = vec![
                ("format", "json".to_string()),
                ("markupFormat", "markdown".to_string()),
                ("query.term", term.to_string()),
                ("pageSize", self.page_size.to_string()),
            ];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let response = self
                .client
                .client()
                .get(&url)
                .query(&params)
                .send()
                .await
                .map_err(|e| SourceError::Network(format!("Failed to search studies: {}", e)))?;

            if !response.status().is_success() {
                return Err(SourceError::Api(format!(
                    "ClinicalTrials.gov returned status: {}",
                    response.status()
                )));
            }

            let page: StudiesPage = response
                .json()
                .await
                .map_err(|e| SourceError::Parse(format!("Failed to parse studies page: {}", e)))?;

            if page.studies.is_empty() {
                break;
            }
            studies.extend(page.studies);

            page_token = page.next_page_token;
            page_count += 1;
            if page_token.is_none() || page_count >= self.max_pages {
                break;
            }
        }

        Ok(studies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_page_with_token() {
        let json = r#"{"studies": [{"protocolSection": {}}], "nextPageToken": "abc"}"#;
        let page: StudiesPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.studies.len(), 1);
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));
    }

    #[test]
    fn parses_terminal_page() {
        let json = r#"{"studies": []}"#;
        let page: StudiesPage = serde_json::from_str(json).unwrap();
        assert!(page.studies.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
