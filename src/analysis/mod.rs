//! Publication normalization and aggregate statistics.
//!
//! [`extract_publication_info`] reshapes raw efetch records into
//! [`PublicationRecord`]s while tallying run-wide accumulators;
//! [`aggregate`] turns one physician's full set into their profile document.

mod aggregate;
mod extract;

pub use aggregate::aggregate;
pub use extract::{extract_publication_info, CoauthorTally, PublicationSet};
