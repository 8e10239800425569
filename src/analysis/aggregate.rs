//! Roster-level summary statistics over one physician's publication set.

use std::collections::{BTreeMap, HashSet};

use crate::analysis::PublicationSet;
use crate::models::{CitedArticle, DoctorPublicationProfile, RosterEntry};

const TOP_COAUTHOR_COUNT: usize = 10;
const TOP_CITED_COUNT: usize = 5;

/// Build the profile document from one physician's extracted publication
/// set. Pure; everything is recomputed from scratch, nothing is merged with
/// a previously stored profile.
pub fn aggregate(entry: &RosterEntry, set: PublicationSet) -> DoctorPublicationProfile {
    let total_articles = set.records.len();

    let earliest = set.years.iter().min().copied();
    let latest = set.years.iter().max().copied();

    let mut yearwise: BTreeMap<String, u32> = BTreeMap::new();
    for year in &set.years {
        *yearwise.entry(year.to_string()).or_insert(0) += 1;
    }

    // Deliberate 0.0 floors below: a profile with no usable data reads as
    // zero, never as NaN or a missing field.
    let average_publications_per_year = match (earliest, latest) {
        (Some(earliest), Some(latest)) => {
            total_articles as f64 / f64::from(latest - earliest + 1)
        }
        _ => 0.0,
    };

    let total_coauthor_mentions: usize = set.records.iter().map(|r| r.coauthors.len()).sum();
    let average_coauthors_per_article = if total_articles > 0 {
        total_coauthor_mentions as f64 / total_articles as f64
    } else {
        0.0
    };

    let total_citations: u64 = set.records.iter().map(|r| u64::from(r.citations)).sum();
    let average_citations_per_article = if total_articles > 0 {
        total_citations as f64 / total_articles as f64
    } else {
        0.0
    };

    // Stable sort keeps first-encountered order among equal citation counts.
    let mut ranked: Vec<&crate::models::PublicationRecord> = set.records.iter().collect();
    ranked.sort_by(|a, b| b.citations.cmp(&a.citations));
    let top_cited_articles = ranked
        .into_iter()
        .take(TOP_CITED_COUNT)
        .map(|record| CitedArticle {
            pmid: record.pmid.clone(),
            title: record.title.clone(),
            journal: record.journal.clone(),
            link: record.link.clone(),
            citations: record.citations,
            publication_date: record.publication_date.clone(),
        })
        .collect();

    // First-seen dedup keeps the output deterministic run-to-run.
    let mut seen = HashSet::new();
    let affiliations: Vec<String> = set
        .subject_affiliations
        .iter()
        .filter(|a| seen.insert(a.as_str().to_string()))
        .cloned()
        .collect();

    let unique_journal_count = set.journals.len();
    let top_coauthors = set.coauthors.top(TOP_COAUTHOR_COUNT);

    DoctorPublicationProfile {
        record_id: entry.record_id.clone(),
        full_name: entry.full_name.clone(),
        total_articles,
        earliest_publication_year: earliest,
        latest_publication_year: latest,
        yearwise_article_counts: yearwise,
        average_publications_per_year,
        unique_coauthor_count: set.coauthors.unique_count(),
        average_coauthors_per_article,
        top_coauthors,
        publication_types: set.publication_types,
        keywords: set.keywords,
        journals: set.journals,
        unique_journal_count,
        total_citations,
        average_citations_per_article,
        top_cited_articles,
        affiliations,
        articles: set.records,
    }
}
