//! Normalized publication records and the per-physician profile document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One author of an article with the affiliations observed on that article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleAuthor {
    pub name: String,
    pub affiliations: Vec<String>,
}

/// Subject-classification terms of one article, partitioned for search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTerms {
    /// MeSH descriptors flagged `MajorTopicYN="Y"`
    pub mesh_major_topics: Vec<String>,
    /// Qualifier terms attached to any descriptor, collected flat
    pub mesh_subheadings: Vec<String>,
    /// Remaining MeSH descriptors
    pub mesh_terms: Vec<String>,
    /// Free-text keywords
    pub other_terms: Vec<String>,
    /// Supplementary concept substance names
    pub supplementary_concepts: Vec<String>,
}

/// One normalized scholarly article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationRecord {
    pub pmid: String,
    pub title: String,
    pub journal: String,
    pub link: String,
    pub citations: u32,
    /// `YYYY-MM-DD` with month/day defaulting to `01`; `"Unknown"` when the
    /// source carries no year (such records are excluded from year-based
    /// statistics).
    pub publication_date: String,
    pub coauthors: Vec<String>,
    pub authors: Vec<ArticleAuthor>,
    pub keywords: Vec<String>,
    pub topics: Vec<String>,
    pub publication_types: Vec<String>,
    pub journal_country: String,
    pub search_terms: SearchTerms,
}

/// A co-author ranked by how often they appear across the subject's articles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoauthorSummary {
    pub name: String,
    pub count: u32,
    /// Union of affiliations observed for this name across the whole run
    pub affiliations: Vec<String>,
}

/// Citation-ranked article summary (top-5 listing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitedArticle {
    pub pmid: String,
    pub title: String,
    pub journal: String,
    pub link: String,
    pub citations: u32,
    pub publication_date: String,
}

/// Per-physician publication profile: aggregate statistics plus the full
/// normalized article list. Fully recomputed and overwritten on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorPublicationProfile {
    pub record_id: String,
    pub full_name: String,
    pub total_articles: usize,
    pub earliest_publication_year: Option<i32>,
    pub latest_publication_year: Option<i32>,
    /// Resolved publication years and how many articles fall in each
    pub yearwise_article_counts: BTreeMap<String, u32>,
    /// Articles per covered year; 0 when no year resolved
    pub average_publications_per_year: f64,
    pub unique_coauthor_count: usize,
    pub average_coauthors_per_article: f64,
    pub top_coauthors: Vec<CoauthorSummary>,
    pub publication_types: BTreeMap<String, u32>,
    pub keywords: BTreeMap<String, u32>,
    pub journals: BTreeMap<String, u32>,
    pub unique_journal_count: usize,
    pub total_citations: u64,
    pub average_citations_per_article: f64,
    pub top_cited_articles: Vec<CitedArticle>,
    /// Distinct affiliations observed for the subject, in first-seen order
    pub affiliations: Vec<String>,
    pub articles: Vec<PublicationRecord>,
}
