//! Normalization of raw PubMed records into [`PublicationRecord`]s.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::{ArticleAuthor, CoauthorSummary, PublicationRecord, SearchTerms};
use crate::sources::PubmedArticle;
use crate::sources::pubmed::PubDate;

/// Co-author frequency counter that remembers first-encounter order, so
/// ranking ties resolve to whoever appeared first in the record stream.
#[derive(Debug, Default)]
pub struct CoauthorTally {
    order: Vec<String>,
    counts: HashMap<String, u32>,
    affiliations: HashMap<String, BTreeSet<String>>,
}

impl CoauthorTally {
    /// Count one appearance of `name` and fold in the affiliations observed
    /// on this article. Affiliation sets only ever grow during a run.
    pub fn observe(&mut self, name: &str, affiliations: &[String]) {
        if !self.counts.contains_key(name) {
            self.order.push(name.to_string());
        }
        *self.counts.entry(name.to_string()).or_insert(0) += 1;
        self.affiliations
            .entry(name.to_string())
            .or_default()
            .extend(affiliations.iter().cloned());
    }

    /// Number of distinct co-authors observed
    pub fn unique_count(&self) -> usize {
        self.order.len()
    }

    /// Top `n` co-authors by count, descending; ties keep first-encounter
    /// order (stable sort).
    pub fn top(&self, n: usize) -> Vec<CoauthorSummary> {
        let mut ranked: Vec<&String> = self.order.iter().collect();
        ranked.sort_by(|a, b| self.counts[b.as_str()].cmp(&self.counts[a.as_str()]));
        ranked
            .into_iter()
            .take(n)
            .map(|name| CoauthorSummary {
                name: name.clone(),
                count: self.counts[name.as_str()],
                affiliations: self
                    .affiliations
                    .get(name.as_str())
                    .map(|set| set.iter().cloned().collect())
                    .unwrap_or_default(),
            })
            .collect()
    }
}

/// One physician's normalized articles plus the run-wide accumulators that
/// feed [`aggregate`](crate::analysis::aggregate).
#[derive(Debug, Default)]
pub struct PublicationSet {
    pub records: Vec<PublicationRecord>,
    /// Resolved publication years, one entry per dated article
    pub years: Vec<i32>,
    pub coauthors: CoauthorTally,
    pub publication_types: BTreeMap<String, u32>,
    pub keywords: BTreeMap<String, u32>,
    pub journals: BTreeMap<String, u32>,
    /// Affiliations observed on the subject themselves (not yet deduplicated)
    pub subject_affiliations: Vec<String>,
}

/// Compose `YYYY-MM-DD` from a PubDate, defaulting month and day to `01`.
/// Returns the date string and the year usable for statistics; a record
/// without a year is `"Unknown"` and contributes no year.
fn compose_date(pub_date: Option<&PubDate>) -> (String, Option<i32>) {
    let year = pub_date
        .and_then(|pd| pd.year.as_ref())
        .map(|y| y.value.trim().to_string())
        .filter(|y| !y.is_empty());

    let Some(year) = year else {
        return ("Unknown".to_string(), None);
    };

    let month = pub_date
        .and_then(|pd| pd.month.as_ref())
        .map(|m| m.value.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "01".to_string());
    let day = pub_date
        .and_then(|pd| pd.day.as_ref())
        .map(|d| d.value.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| "01".to_string());

    let resolved = year.parse::<i32>().ok();
    (format!("{}-{}-{}", year, month, day), resolved)
}

fn tally(map: &mut BTreeMap<String, u32>, key: &str) {
    *map.entry(key.to_string()).or_insert(0) += 1;
}

/// Normalize raw efetch records for one physician.
///
/// Single pass: every article becomes a [`PublicationRecord`]; authors whose
/// normalized name equals `subject_name` (case-insensitive) are the subject,
/// everyone else feeds the co-author tally. Citation counts come from the
/// elink map and default to 0.
pub fn extract_publication_info(
    articles: &[PubmedArticle],
    subject_name: &str,
    citation_counts: &HashMap<String, u32>,
) -> PublicationSet {
    let subject_lower = subject_name.to_lowercase();
    let mut set = PublicationSet::default();

    for raw in articles {
        let Some(medline) = raw.medline.as_ref() else {
            continue;
        };
        let Some(article) = medline.article.as_ref() else {
            continue;
        };

        let pmid = medline
            .pmid
            .as_ref()
            .map(|p| p.value.clone())
            .unwrap_or_default();
        let title = article
            .title
            .as_ref()
            .map(|t| t.value.clone())
            .unwrap_or_else(|| "No Title".to_string());
        let journal = article
            .journal
            .as_ref()
            .and_then(|j| j.title.as_ref())
            .map(|t| t.value.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let journal_country = medline
            .journal_info
            .as_ref()
            .and_then(|info| info.country.as_ref())
            .map(|c| c.value.clone())
            .unwrap_or_default();
        let link = format!("https://pubmed.ncbi.nlm.nih.gov/{}/", pmid);

        let (publication_date, year) = compose_date(
            article
                .journal
                .as_ref()
                .and_then(|j| j.issue.as_ref())
                .and_then(|issue| issue.pub_date.as_ref()),
        );
        if let Some(year) = year {
            set.years.push(year);
        }

        let publication_types: Vec<String> = article
            .publication_types
            .as_ref()
            .map(|list| {
                list.types
                    .iter()
                    .map(|t| t.value.clone())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        for pt in &publication_types {
            tally(&mut set.publication_types, pt);
        }

        let keywords: Vec<String> = article
            .keyword_list
            .as_ref()
            .map(|list| {
                list.keywords
                    .iter()
                    .map(|k| k.value.clone())
                    .filter(|k| !k.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        for kw in &keywords {
            tally(&mut set.keywords, kw);
        }
        tally(&mut set.journals, &journal);

        // Author partition: subject vs co-authors
        let mut authors = Vec::new();
        let mut coauthors = Vec::new();
        if let Some(author_list) = article.author_list.as_ref() {
            for author in &author_list.authors {
                let fore = author
                    .fore_name
                    .as_ref()
                    .map(|f| f.value.as_str())
                    .unwrap_or("");
                let last = author
                    .last_name
                    .as_ref()
                    .map(|l| l.value.as_str())
                    .unwrap_or("");
                let full_name = format!("{} {}", fore, last).trim().to_string();
                if full_name.is_empty() {
                    continue;
                }

                let affiliations: Vec<String> = author
                    .affiliation_info
                    .iter()
                    .filter_map(|info| info.affiliation.as_ref())
                    .map(|a| a.value.clone())
                    .filter(|a| !a.is_empty())
                    .collect();

                authors.push(ArticleAuthor {
                    name: full_name.clone(),
                    affiliations: affiliations.clone(),
                });

                if full_name.to_lowercase() == subject_lower {
                    set.subject_affiliations.extend(affiliations);
                } else {
                    set.coauthors.observe(&full_name, &affiliations);
                    coauthors.push(full_name);
                }
            }
        }

        // MeSH classification: explicit major-topic flag wins, everything
        // else is a plain term; qualifiers collect flat as subheadings.
        let mut search_terms = SearchTerms::default();
        if let Some(mesh) = medline.mesh_headings.as_ref() {
            for heading in &mesh.headings {
                if let Some(descriptor) = heading.descriptor.as_ref() {
                    if descriptor.is_major_topic() {
                        search_terms.mesh_major_topics.push(descriptor.name.clone());
                    } else {
                        search_terms.mesh_terms.push(descriptor.name.clone());
                    }
                    for qualifier in &heading.qualifiers {
                        search_terms.mesh_subheadings.push(qualifier.name.clone());
                    }
                }
            }
        }
        if let Some(supplementary) = medline.supplementary_concepts.as_ref() {
            for concept in &supplementary.concepts {
                if let Some(name) = concept.name_of_substance.as_ref() {
                    if !name.value.is_empty() {
                        search_terms.supplementary_concepts.push(name.value.clone());
                    }
                }
            }
        }
        search_terms.other_terms = keywords.clone();

        set.records.push(PublicationRecord {
            citations: citation_counts.get(&pmid).copied().unwrap_or(0),
            topics: search_terms.mesh_terms.clone(),
            pmid,
            title,
            journal,
            link,
            publication_date,
            coauthors,
            authors,
            keywords,
            publication_types,
            journal_country,
            search_terms,
        });
    }

    set
}
