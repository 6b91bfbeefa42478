//! Data-layer error types.

use thiserror::Error;

/// Failures reported by a `MutationStore`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The gene has no rows in the queried table.
    #[error("no expression data for gene '{gene}'")]
    GeneNotFound { gene: String },

    /// The store could not be reached at all.
    #[error("data store unavailable: {0}")]
    Unavailable(String),

    /// The store was reachable but the query failed.
    #[error("query failed: {0}")]
    Query(String),
}

impl StoreError {
    /// Expected "no data" outcomes, as opposed to infrastructure faults.
    pub fn is_domain(&self) -> bool {
        matches!(self, Self::GeneNotFound { .. })
    }
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;
