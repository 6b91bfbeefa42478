//! The data query interface consumed by the dispatcher.

use async_trait::async_trait;
use cbq_protocol::GeneSymbol;

use crate::error::StoreResult;

/// `least_mutated_genes` limit used when the caller passes `n <= 0`.
pub const DEFAULT_LEAST_N: i64 = 10;

/// Typed query functions over the mutation, expression and clinical tables.
///
/// Gene comparisons are case-insensitive in every implementation.
#[async_trait]
pub trait MutationStore: Send + Sync {
    /// The `n` genes with the most mutations, most-mutated first.
    async fn top_mutated_genes(&self, n: u32) -> StoreResult<Vec<String>>;

    /// The genes with the fewest mutations, least-mutated first.
    /// `n <= 0` falls back to [`DEFAULT_LEAST_N`].
    async fn least_mutated_genes(&self, n: i64) -> StoreResult<Vec<String>>;

    /// Number of mutation rows for `gene` (0 when absent).
    async fn mutation_count_for_gene(&self, gene: &GeneSymbol) -> StoreResult<i64>;

    /// Genes whose mutation count is strictly greater than `threshold`.
    async fn genes_above_threshold(&self, threshold: u64) -> StoreResult<Vec<String>>;

    /// Distinct patients present in the mutation table.
    async fn total_patients(&self) -> StoreResult<i64>;

    /// Distinct mutation types observed for `gene`.
    async fn mutation_types_for_gene(&self, gene: &GeneSymbol) -> StoreResult<Vec<String>>;

    /// Expression value of the first sample for `gene`.
    /// Fails with `StoreError::GeneNotFound` when the gene has no row.
    async fn mrna_expression(&self, gene: &GeneSymbol) -> StoreResult<f64>;

    /// Mean age at diagnosis (0.0 when no ages are recorded).
    async fn average_age_at_diagnosis(&self) -> StoreResult<f64>;

    /// Patient count per tumor stage, ordered by stage.
    async fn patient_count_by_stage(&self) -> StoreResult<Vec<(String, i64)>>;
}

/// Apply the `least_mutated_genes` default.
pub fn effective_least_n(n: i64) -> i64 {
    if n > 0 { n } else { DEFAULT_LEAST_N }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_n_defaults_when_non_positive() {
        assert_eq!(effective_least_n(0), 10);
        assert_eq!(effective_least_n(-4), 10);
        assert_eq!(effective_least_n(3), 3);
    }
}
