//! PubMed E-utilities client: esearch, efetch and elink.
//!
//! Detail and citation lookups run in fixed-size id batches with a fixed
//! delay between batches (NCBI asks for at most 3 requests/second without an
//! API key). A failed batch is logged and dropped; the caller decides whether
//! ending up with nothing is a failure.

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::PubMedSettings;
use crate::sources::SourceError;
use crate::utils::HttpClient;

const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

// ===== efetch payload (PubmedArticleSet) =====

/// Simple element wrapper: `<Tag>text</Tag>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextValue {
    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PubmedArticleSet {
    #[serde(rename = "PubmedArticle", default)]
    pub articles: Vec<PubmedArticle>,
}

/// One raw `<PubmedArticle>` record as returned by efetch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PubmedArticle {
    #[serde(rename = "MedlineCitation")]
    pub medline: Option<MedlineCitation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedlineCitation {
    #[serde(rename = "PMID")]
    pub pmid: Option<TextValue>,
    #[serde(rename = "Article")]
    pub article: Option<ArticleData>,
    #[serde(rename = "MedlineJournalInfo")]
    pub journal_info: Option<MedlineJournalInfo>,
    #[serde(rename = "MeshHeadingList")]
    pub mesh_headings: Option<MeshHeadingList>,
    #[serde(rename = "SupplementaryConceptList")]
    pub supplementary_concepts: Option<SupplementaryConceptList>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleData {
    #[serde(rename = "Journal")]
    pub journal: Option<Journal>,
    #[serde(rename = "ArticleTitle")]
    pub title: Option<TextValue>,
    #[serde(rename = "AuthorList")]
    pub author_list: Option<AuthorList>,
    #[serde(rename = "PublicationTypeList")]
    pub publication_types: Option<PublicationTypeList>,
    #[serde(rename = "KeywordList")]
    pub keyword_list: Option<KeywordList>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Journal {
    #[serde(rename = "Title")]
    pub title: Option<TextValue>,
    #[serde(rename = "JournalIssue")]
    pub issue: Option<JournalIssue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalIssue {
    #[serde(rename = "PubDate")]
    pub pub_date: Option<PubDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PubDate {
    #[serde(rename = "Year")]
    pub year: Option<TextValue>,
    #[serde(rename = "Month")]
    pub month: Option<TextValue>,
    #[serde(rename = "Day")]
    pub day: Option<TextValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorList {
    #[serde(rename = "Author", default)]
    pub authors: Vec<AuthorEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorEntry {
    #[serde(rename = "LastName")]
    pub last_name: Option<TextValue>,
    #[serde(rename = "ForeName")]
    pub fore_name: Option<TextValue>,
    #[serde(rename = "AffiliationInfo", default)]
    pub affiliation_info: Vec<AffiliationInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AffiliationInfo {
    #[serde(rename = "Affiliation")]
    pub affiliation: Option<TextValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicationTypeList {
    #[serde(rename = "PublicationType", default)]
    pub types: Vec<TextValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeywordList {
    #[serde(rename = "Keyword", default)]
    pub keywords: Vec<TextValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedlineJournalInfo {
    #[serde(rename = "Country")]
    pub country: Option<TextValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeshHeadingList {
    #[serde(rename = "MeshHeading", default)]
    pub headings: Vec<MeshHeading>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeshHeading {
    #[serde(rename = "DescriptorName")]
    pub descriptor: Option<MeshTerm>,
    #[serde(rename = "QualifierName", default)]
    pub qualifiers: Vec<MeshTerm>,
}

/// MeSH descriptor or qualifier with its major-topic flag
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeshTerm {
    #[serde(rename = "@MajorTopicYN")]
    pub major_topic: Option<String>,
    #[serde(rename = "$text", default)]
    pub name: String,
}

impl MeshTerm {
    pub fn is_major_topic(&self) -> bool {
        self.major_topic.as_deref() == Some("Y")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplementaryConceptList {
    #[serde(rename = "SupplementaryConcept", default)]
    pub concepts: Vec<SupplementaryConcept>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplementaryConcept {
    #[serde(rename = "NameOfSubstance")]
    pub name_of_substance: Option<TextValue>,
}

// ===== esearch payload =====

#[derive(Debug, Deserialize)]
struct ESearchEnvelope {
    #[serde(rename = "esearchresult", default)]
    result: ESearchResult,
}

#[derive(Debug, Default, Deserialize)]
struct ESearchResult {
    #[serde(rename = "idlist", default)]
    id_list: Vec<String>,
}

// ===== elink payload =====

#[derive(Debug, Deserialize)]
struct ELinkResult {
    #[serde(rename = "LinkSet", default)]
    link_sets: Vec<LinkSet>,
}

#[derive(Debug, Default, Deserialize)]
struct LinkSet {
    #[serde(rename = "IdList")]
    id_list: Option<ELinkIdList>,
    #[serde(rename = "LinkSetDb", default)]
    link_set_dbs: Vec<LinkSetDb>,
}

#[derive(Debug, Default, Deserialize)]
struct ELinkIdList {
    #[serde(rename = "Id", default)]
    ids: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LinkSetDb {
    #[serde(rename = "Link", default)]
    links: Vec<ELinkLink>,
}

#[derive(Debug, Default, Deserialize)]
struct ELinkLink {
    #[allow(dead_code)]
    #[serde(rename = "Id", default)]
    id: String,
}

// ===== client =====

/// Client for the PubMed E-utilities endpoints.
#[derive(Debug, Clone)]
pub struct PubMedClient {
    client: HttpClient,
    base_url: String,
    retmax: usize,
    batch_size: usize,
    batch_delay: Duration,
}

impl PubMedClient {
    /// Create a new client against the public E-utilities host
    pub fn new(settings: &PubMedSettings) -> Self {
        Self {
            client: HttpClient::new(),
            base_url: EUTILS_BASE_URL.to_string(),
            retmax: settings.retmax,
            // a zero batch size would make `chunks` panic
            batch_size: settings.batch_size.max(1),
            batch_delay: Duration::from_millis(settings.batch_delay_ms),
        }
    }

    /// Point the client at a different base URL (for testing)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Search PMIDs for articles authored by `name`.
    pub async fn search_pmids(&self, name: &str) -> Result<Vec<String>, SourceError> {
        self.search_pmids_with_affiliation(name, None).await
    }

    /// Search PMIDs for articles authored by `name`. The affiliation filter
    /// is accepted but not yet composed into the query; whether the search
    /// should be restricted by affiliation is still an open product
    /// question, so the term stays name-only for now.
    pub async fn search_pmids_with_affiliation(
        &self,
        name: &str,
        _affiliation: Option<&str>,
    ) -> Result<Vec<String>, SourceError> {
        let term = format!("{}[Author]", name);
        let url = format!(
            "{}/esearch.fcgi?db=pubmed&term={}&retmax={}&retmode=json",
            self.base_url,
            urlencoding::encode(&term),
            self.retmax
        );

        let response = self
            .client
            .client()
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to search PubMed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "PubMed esearch returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;

        let envelope: ESearchEnvelope = serde_json::from_str(&body)
            .map_err(|e| SourceError::Parse(format!("Failed to parse esearch JSON: {}", e)))?;

        Ok(envelope.result.id_list)
    }

    /// Fetch full article records for `pmids` in batches.
    ///
    /// A batch that fails to fetch or parse is logged and skipped; the
    /// remaining batches still contribute. Returns every article retrieved.
    pub async fn fetch_articles(&self, pmids: &[String]) -> Vec<PubmedArticle> {
        let mut articles = Vec::new();
        let mut chunks = pmids.chunks(self.batch_size).peekable();

        while let Some(chunk) = chunks.next() {
            match self.fetch_article_batch(chunk).await {
                Ok(batch) => articles.extend(batch),
                Err(err) => {
                    tracing::warn!(
                        first = chunk.first().map(String::as_str).unwrap_or(""),
                        last = chunk.last().map(String::as_str).unwrap_or(""),
                        "error fetching article batch: {}",
                        err
                    );
                }
            }
            if chunks.peek().is_some() {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        articles
    }

    async fn fetch_article_batch(&self, pmids: &[String]) -> Result<Vec<PubmedArticle>, SourceError> {
        let url = format!(
            "{}/efetch.fcgi?db=pubmed&id={}&retmode=xml",
            self.base_url,
            pmids.join(",")
        );

        let response = self
            .client
            .client()
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch articles: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "PubMed efetch returned status: {}",
                response.status()
            )));
        }

        let xml = response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;

        Self::parse_fetch_response(&xml)
    }

    fn parse_fetch_response(xml: &str) -> Result<Vec<PubmedArticle>, SourceError> {
        let set: PubmedArticleSet = quick_xml::de::from_str(xml)
            .map_err(|e| SourceError::Parse(format!("Failed to parse efetch XML: {}", e)))?;
        Ok(set.articles)
    }

    /// Fetch "cited in" counts for `pmids` via elink, batched the same way
    /// as [`fetch_articles`](Self::fetch_articles). PMIDs without citation
    /// data simply have no entry; callers default to 0.
    pub async fn fetch_citation_counts(&self, pmids: &[String]) -> HashMap<String, u32> {
        let mut counts = HashMap::new();
        let mut chunks = pmids.chunks(self.batch_size).peekable();

        while let Some(chunk) = chunks.next() {
            match self.fetch_citation_batch(chunk).await {
                Ok(batch) => counts.extend(batch),
                Err(err) => {
                    tracing::warn!(
                        first = chunk.first().map(String::as_str).unwrap_or(""),
                        last = chunk.last().map(String::as_str).unwrap_or(""),
                        "error fetching citation batch: {}",
                        err
                    );
                }
            }
            if chunks.peek().is_some() {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        counts
    }

    async fn fetch_citation_batch(
        &self,
        pmids: &[String],
    ) -> Result<HashMap<String, u32>, SourceError> {
        let url = format!(
            "{}/elink.fcgi?dbfrom=pubmed&linkname=pubmed_pubmed_citedin&id={}&retmode=xml",
            self.base_url,
            pmids.join(",")
        );

        let response = self
            .client
            .client()
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch citations: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "PubMed elink returned status: {}",
                response.status()
            )));
        }

        let xml = response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;

        Self::parse_citation_response(&xml)
    }

    fn parse_citation_response(xml: &str) -> Result<HashMap<String, u32>, SourceError> {
        let result: ELinkResult = quick_xml::de::from_str(xml)
            .map_err(|e| SourceError::Parse(format!("Failed to parse elink XML: {}", e)))?;

        let mut counts = HashMap::new();
        for link_set in result.link_sets {
            let Some(pmid) = link_set
                .id_list
                .as_ref()
                .and_then(|ids| ids.ids.first())
            else {
                continue;
            };
            let total: usize = link_set
                .link_set_dbs
                .iter()
                .map(|db| db.links.len())
                .sum();
            counts.insert(pmid.clone(), total as u32);
        }
        Ok(counts)
    }
}
