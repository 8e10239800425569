//! Publications pipeline: search, fetch, aggregate, overwrite per entry.

use crate::analysis::{aggregate, extract_publication_info};
use crate::config::PubMedSettings;
use crate::models::RosterEntry;
use crate::pipeline::{EntryError, FailureReporter};
use crate::sources::PubMedClient;
use crate::store::ProfileStore;

/// Process one roster entry end to end and overwrite their profile.
///
/// Batch-level fetch failures have already been dropped inside the client;
/// the entry only fails if no usable records remain at all.
pub async fn process_entry(
    client: &PubMedClient,
    store: &dyn ProfileStore,
    settings: &PubMedSettings,
    entry: &RosterEntry,
) -> Result<usize, EntryError> {
    let pmids = client
        .search_pmids_with_affiliation(&entry.full_name, settings.affiliation.as_deref())
        .await?;
    if pmids.is_empty() {
        return Err(EntryError::Empty("No publications found".to_string()));
    }

    let articles = client.fetch_articles(&pmids).await;
    if articles.is_empty() {
        return Err(EntryError::Empty("No article data retrieved".to_string()));
    }

    let citation_counts = client.fetch_citation_counts(&pmids).await;

    let set = extract_publication_info(&articles, &entry.full_name, &citation_counts);
    let profile = aggregate(entry, set);
    let article_count = profile.total_articles;

    store.save_profile(&profile).await?;
    Ok(article_count)
}

/// Run the whole roster sequentially, recording failures and logging one
/// line per entry.
pub async fn run(
    client: &PubMedClient,
    store: &dyn ProfileStore,
    settings: &PubMedSettings,
    roster: &[RosterEntry],
    reporter: &mut FailureReporter,
) {
    for entry in roster {
        match process_entry(client, store, settings, entry).await {
            Ok(article_count) => {
                tracing::info!(
                    record_id = entry.record_id.as_str(),
                    name = entry.full_name.as_str(),
                    "profiled {} articles",
                    article_count
                );
            }
            Err(err) => {
                tracing::error!(
                    record_id = entry.record_id.as_str(),
                    name = entry.full_name.as_str(),
                    "publications entry failed: {}",
                    err
                );
                reporter.record(entry, err.to_string());
            }
        }
    }
}
