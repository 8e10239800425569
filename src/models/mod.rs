//! Core data models for roster entries, trial documents and publication profiles.

mod publication;
mod roster;
mod trial;

pub use publication::{
    ArticleAuthor, CitedArticle, CoauthorSummary, DoctorPublicationProfile, PublicationRecord,
    SearchTerms,
};
pub use roster::{read_roster, RosterEntry, RosterError};
pub use trial::{DoctorTrialsDocument, Organization, TrialOverview, TrialRecord};
