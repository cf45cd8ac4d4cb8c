//! Taxonomy terms for the job-type panel

use serde::{Deserialize, Serialize};

/// Taxonomy holding job types.
pub const JOB_TYPE_TAXONOMY: &str = "job_listing_type";

/// A taxonomy term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: u64,
    pub name: String,
    /// Number of listings carrying the term.
    #[serde(default)]
    pub count: u64,
}

/// Read access to taxonomy terms.
pub trait TermSource: Send + Sync {
    /// Every term of the taxonomy, including unused ones.
    fn terms(&self, taxonomy: &str) -> Vec<Term>;

    /// The `limit` most used terms, most used first.
    fn popular_terms(&self, taxonomy: &str, limit: usize) -> Vec<Term>;

    /// Terms attached to a listing.
    fn listing_terms(&self, listing_id: u64, taxonomy: &str) -> Vec<Term>;

    fn count_terms(&self, taxonomy: &str) -> usize {
        self.terms(taxonomy).len()
    }
}
