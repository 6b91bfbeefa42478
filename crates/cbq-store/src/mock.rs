//! Mock store for testing.
//!
//! Returns scripted results and records every call so tests can assert the
//! data layer was (or was not) touched.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use cbq_protocol::GeneSymbol;

use crate::error::{StoreError, StoreResult};
use crate::store::MutationStore;

/// Scripted `MutationStore` with call recording.
pub struct MockStore {
    /// Genes ordered most-mutated first.
    ranked_genes: Vec<String>,
    mutation_counts: HashMap<String, i64>,
    total_patients: i64,
    mutation_types: HashMap<String, Vec<String>>,
    expression: HashMap<String, f64>,
    average_age: f64,
    stages: Vec<(String, i64)>,
    /// When set, every call fails with `StoreError::Unavailable`.
    unavailable: Option<String>,
    /// Method calls with their arguments, e.g. `top_mutated_genes(5)`.
    calls: Mutex<Vec<String>>,
}

impl MockStore {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self {
            ranked_genes: Vec::new(),
            mutation_counts: HashMap::new(),
            total_patients: 0,
            mutation_types: HashMap::new(),
            expression: HashMap::new(),
            average_age: 0.0,
            stages: Vec::new(),
            unavailable: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Genes in descending mutation order.
    pub fn with_genes(mut self, genes: &[&str]) -> Self {
        self.ranked_genes = genes.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn with_mutation_count(mut self, gene: &str, count: i64) -> Self {
        self.mutation_counts.insert(gene.to_uppercase(), count);
        self
    }

    pub fn with_total_patients(mut self, total: i64) -> Self {
        self.total_patients = total;
        self
    }

    pub fn with_mutation_types(mut self, gene: &str, types: &[&str]) -> Self {
        self.mutation_types.insert(
            gene.to_uppercase(),
            types.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    pub fn with_expression(mut self, gene: &str, value: f64) -> Self {
        self.expression.insert(gene.to_uppercase(), value);
        self
    }

    pub fn with_average_age(mut self, age: f64) -> Self {
        self.average_age = age;
        self
    }

    pub fn with_stages(mut self, stages: &[(&str, i64)]) -> Self {
        self.stages = stages.iter().map(|(s, c)| (s.to_string(), *c)).collect();
        self
    }

    /// Make every call fail as if the store could not be reached.
    pub fn unavailable(mut self, reason: &str) -> Self {
        self.unavailable = Some(reason.to_string());
        self
    }

    /// Get copies of all recorded calls.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> StoreResult<()> {
        self.calls.lock().unwrap().push(call);
        match &self.unavailable {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn count_of(&self, gene: &str) -> i64 {
        self.mutation_counts.get(gene).copied().unwrap_or(0)
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MutationStore for MockStore {
    async fn top_mutated_genes(&self, n: u32) -> StoreResult<Vec<String>> {
        self.record(format!("top_mutated_genes({n})"))?;
        Ok(self.ranked_genes.iter().take(n as usize).cloned().collect())
    }

    async fn least_mutated_genes(&self, n: i64) -> StoreResult<Vec<String>> {
        self.record(format!("least_mutated_genes({n})"))?;
        let limit = usize::try_from(crate::store::effective_least_n(n)).unwrap_or(usize::MAX);
        Ok(self
            .ranked_genes
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn mutation_count_for_gene(&self, gene: &GeneSymbol) -> StoreResult<i64> {
        self.record(format!("mutation_count_for_gene({gene})"))?;
        Ok(self.count_of(gene.as_str()))
    }

    async fn genes_above_threshold(&self, threshold: u64) -> StoreResult<Vec<String>> {
        self.record(format!("genes_above_threshold({threshold})"))?;
        let threshold = i64::try_from(threshold).unwrap_or(i64::MAX);
        Ok(self
            .ranked_genes
            .iter()
            .filter(|g| self.count_of(g) > threshold)
            .cloned()
            .collect())
    }

    async fn total_patients(&self) -> StoreResult<i64> {
        self.record("total_patients()".into())?;
        Ok(self.total_patients)
    }

    async fn mutation_types_for_gene(&self, gene: &GeneSymbol) -> StoreResult<Vec<String>> {
        self.record(format!("mutation_types_for_gene({gene})"))?;
        Ok(self
            .mutation_types
            .get(gene.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn mrna_expression(&self, gene: &GeneSymbol) -> StoreResult<f64> {
        self.record(format!("mrna_expression({gene})"))?;
        self.expression
            .get(gene.as_str())
            .copied()
            .ok_or_else(|| StoreError::GeneNotFound {
                gene: gene.to_string(),
            })
    }

    async fn average_age_at_diagnosis(&self) -> StoreResult<f64> {
        self.record("average_age_at_diagnosis()".into())?;
        Ok(self.average_age)
    }

    async fn patient_count_by_stage(&self) -> StoreResult<Vec<(String, i64)>> {
        self.record("patient_count_by_stage()".into())?;
        Ok(self.stages.clone())
    }
}
