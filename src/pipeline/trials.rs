//! Clinical-trials pipeline: search, flatten, upsert per roster entry.

use crate::models::{RosterEntry, TrialOverview, TrialRecord};
use crate::pipeline::{EntryError, FailureReporter};
use crate::sources::ClinicalTrialsClient;
use crate::store::{upsert_trial, TrialStore, UpsertOutcome};

/// Counts for the per-entry log line
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TrialStats {
    pub new_trials: usize,
    pub updated_trials: usize,
}

/// Process one roster entry end to end.
///
/// Empty search results are an [`EntryError::Empty`], not a transport
/// failure; studies without an NCT id are skipped silently.
pub async fn process_entry(
    client: &ClinicalTrialsClient,
    store: &dyn TrialStore,
    entry: &RosterEntry,
) -> Result<TrialStats, EntryError> {
    let studies = client.search_studies(&entry.full_name).await?;
    if studies.is_empty() {
        return Err(EntryError::Empty("No studies found".to_string()));
    }

    let mut stats = TrialStats::default();
    for study in studies {
        let protocol = study.get("protocolSection").cloned().unwrap_or_default();
        let overview = TrialOverview::from_protocol(&protocol, &entry.record_id, &entry.full_name);
        if overview.nct_id.is_none() {
            continue;
        }

        let trial = TrialRecord {
            overview,
            raw: study,
        };
        match upsert_trial(store, entry, trial).await? {
            UpsertOutcome::Inserted | UpsertOutcome::Appended => stats.new_trials += 1,
            UpsertOutcome::Updated => stats.updated_trials += 1,
        }
    }

    Ok(stats)
}

/// Run the whole roster sequentially, recording failures and logging one
/// line per entry.
pub async fn run(
    client: &ClinicalTrialsClient,
    store: &dyn TrialStore,
    roster: &[RosterEntry],
    reporter: &mut FailureReporter,
) {
    for entry in roster {
        match process_entry(client, store, entry).await {
            Ok(stats) => {
                tracing::info!(
                    record_id = entry.record_id.as_str(),
                    name = entry.full_name.as_str(),
                    "{} new, {} updated trials",
                    stats.new_trials,
                    stats.updated_trials
                );
            }
            Err(err) => {
                tracing::error!(
                    record_id = entry.record_id.as_str(),
                    name = entry.full_name.as_str(),
                    "trials entry failed: {}",
                    err
                );
                reporter.record(entry, err.to_string());
            }
        }
    }
}
