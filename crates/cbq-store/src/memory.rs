//! In-memory store over a loaded `Dataset`.
//!
//! Mirrors the SQL semantics of `PgStore` (ties are broken by gene name so
//! results are deterministic). Used for offline runs against cBioPortal flat
//! files and as the built-in sample dataset.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use async_trait::async_trait;

use cbq_protocol::GeneSymbol;

use crate::dataset::{self, DatasetError};
use crate::error::{StoreError, StoreResult};
use crate::store::{MutationStore, effective_least_n};

/// One row of the mutation table.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRecord {
    pub gene: String,
    pub patient_id: String,
    pub mutation_type: String,
}

/// One row of the expression table.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionRecord {
    pub gene: String,
    pub value: f64,
}

/// One row of the clinical patient table.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRecord {
    pub patient_id: String,
    pub age_at_diagnosis: Option<f64>,
    pub tumor_stage: Option<String>,
}

/// The three tables backing every operation.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub mutations: Vec<MutationRecord>,
    pub expression: Vec<ExpressionRecord>,
    pub patients: Vec<PatientRecord>,
}

/// Label used for patients without a recorded stage.
pub const UNKNOWN_STAGE: &str = "Unknown";

/// Store answering queries from memory.
pub struct MemoryStore {
    dataset: Dataset,
}

impl MemoryStore {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }

    /// Load a cBioPortal study directory.
    pub async fn from_dir(dir: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let dataset = dataset::load_dir(dir.as_ref()).await?;
        tracing::info!(
            mutations = dataset.mutations.len(),
            expression = dataset.expression.len(),
            patients = dataset.patients.len(),
            "dataset loaded"
        );
        Ok(Self::new(dataset))
    }

    /// Small built-in LUAD-like dataset for demos and tests.
    pub fn with_sample_data() -> Self {
        let mutations = [
            ("TP53", "P-0001", "Missense_Mutation"),
            ("TP53", "P-0002", "Nonsense_Mutation"),
            ("TP53", "P-0003", "Missense_Mutation"),
            ("TP53", "P-0004", "Frame_Shift_Del"),
            ("KRAS", "P-0001", "Missense_Mutation"),
            ("KRAS", "P-0005", "Missense_Mutation"),
            ("KRAS", "P-0006", "Missense_Mutation"),
            ("EGFR", "P-0002", "In_Frame_Del"),
            ("EGFR", "P-0007", "Missense_Mutation"),
            ("STK11", "P-0003", "Nonsense_Mutation"),
            ("KEAP1", "P-0004", "Missense_Mutation"),
        ];
        let expression = [("TP53", 8.42), ("EGFR", 11.07), ("KRAS", 9.35)];
        let patients = [
            ("P-0001", Some(64.0), Some("Stage I")),
            ("P-0002", Some(71.0), Some("Stage II")),
            ("P-0003", Some(58.0), Some("Stage I")),
            ("P-0004", Some(66.0), Some("Stage III")),
            ("P-0005", None, Some("Stage II")),
            ("P-0006", Some(69.0), None),
            ("P-0007", Some(52.0), Some("Stage I")),
        ];

        Self::new(Dataset {
            mutations: mutations
                .iter()
                .map(|(gene, patient, kind)| MutationRecord {
                    gene: (*gene).into(),
                    patient_id: (*patient).into(),
                    mutation_type: (*kind).into(),
                })
                .collect(),
            expression: expression
                .iter()
                .map(|(gene, value)| ExpressionRecord {
                    gene: (*gene).into(),
                    value: *value,
                })
                .collect(),
            patients: patients
                .iter()
                .map(|(id, age, stage)| PatientRecord {
                    patient_id: (*id).into(),
                    age_at_diagnosis: *age,
                    tumor_stage: stage.map(String::from),
                })
                .collect(),
        })
    }

    /// Mutation count per gene.
    fn gene_counts(&self) -> BTreeMap<&str, i64> {
        let mut counts = BTreeMap::new();
        for m in &self.dataset.mutations {
            *counts.entry(m.gene.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Genes ordered by count (then name), ascending or descending.
    fn ranked_genes(&self, descending: bool, limit: usize) -> Vec<String> {
        let mut ranked: Vec<(&str, i64)> = self.gene_counts().into_iter().collect();
        ranked.sort_by(|a, b| {
            let by_count = if descending {
                b.1.cmp(&a.1)
            } else {
                a.1.cmp(&b.1)
            };
            by_count.then_with(|| a.0.cmp(b.0))
        });
        ranked
            .into_iter()
            .take(limit)
            .map(|(gene, _)| gene.to_string())
            .collect()
    }
}

#[async_trait]
impl MutationStore for MemoryStore {
    async fn top_mutated_genes(&self, n: u32) -> StoreResult<Vec<String>> {
        Ok(self.ranked_genes(true, n as usize))
    }

    async fn least_mutated_genes(&self, n: i64) -> StoreResult<Vec<String>> {
        let limit = usize::try_from(effective_least_n(n)).unwrap_or(usize::MAX);
        Ok(self.ranked_genes(false, limit))
    }

    async fn mutation_count_for_gene(&self, gene: &GeneSymbol) -> StoreResult<i64> {
        let count = self
            .dataset
            .mutations
            .iter()
            .filter(|m| m.gene.eq_ignore_ascii_case(gene.as_str()))
            .count();
        Ok(count as i64)
    }

    async fn genes_above_threshold(&self, threshold: u64) -> StoreResult<Vec<String>> {
        let threshold = i64::try_from(threshold).unwrap_or(i64::MAX);
        Ok(self
            .gene_counts()
            .into_iter()
            .filter(|(_, count)| *count > threshold)
            .map(|(gene, _)| gene.to_string())
            .collect())
    }

    async fn total_patients(&self) -> StoreResult<i64> {
        let patients: HashSet<&str> = self
            .dataset
            .mutations
            .iter()
            .map(|m| m.patient_id.as_str())
            .collect();
        Ok(patients.len() as i64)
    }

    async fn mutation_types_for_gene(&self, gene: &GeneSymbol) -> StoreResult<Vec<String>> {
        let types: BTreeSet<&str> = self
            .dataset
            .mutations
            .iter()
            .filter(|m| m.gene.eq_ignore_ascii_case(gene.as_str()))
            .map(|m| m.mutation_type.as_str())
            .collect();
        Ok(types.into_iter().map(String::from).collect())
    }

    async fn mrna_expression(&self, gene: &GeneSymbol) -> StoreResult<f64> {
        self.dataset
            .expression
            .iter()
            .find(|e| e.gene.eq_ignore_ascii_case(gene.as_str()))
            .map(|e| e.value)
            .ok_or_else(|| StoreError::GeneNotFound {
                gene: gene.to_string(),
            })
    }

    async fn average_age_at_diagnosis(&self) -> StoreResult<f64> {
        let ages: Vec<f64> = self
            .dataset
            .patients
            .iter()
            .filter_map(|p| p.age_at_diagnosis)
            .collect();
        if ages.is_empty() {
            return Ok(0.0);
        }
        Ok(ages.iter().sum::<f64>() / ages.len() as f64)
    }

    async fn patient_count_by_stage(&self) -> StoreResult<Vec<(String, i64)>> {
        let mut stages: BTreeMap<&str, i64> = BTreeMap::new();
        for p in &self.dataset.patients {
            let stage = p.tumor_stage.as_deref().unwrap_or(UNKNOWN_STAGE);
            *stages.entry(stage).or_insert(0) += 1;
        }
        Ok(stages
            .into_iter()
            .map(|(stage, count)| (stage.to_string(), count))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gene(s: &str) -> GeneSymbol {
        GeneSymbol::parse(s).unwrap()
    }

    #[tokio::test]
    async fn top_genes_ordered_by_count() {
        let store = MemoryStore::with_sample_data();
        let top = store.top_mutated_genes(3).await.unwrap();
        assert_eq!(top, vec!["TP53", "KRAS", "EGFR"]);
    }

    #[tokio::test]
    async fn least_genes_break_ties_by_name() {
        let store = MemoryStore::with_sample_data();
        let least = store.least_mutated_genes(2).await.unwrap();
        assert_eq!(least, vec!["KEAP1", "STK11"]);
    }

    #[tokio::test]
    async fn least_genes_default_limit() {
        let store = MemoryStore::with_sample_data();
        let least = store.least_mutated_genes(0).await.unwrap();
        // Only 5 genes in the sample, fewer than the default of 10.
        assert_eq!(least.len(), 5);
    }

    #[tokio::test]
    async fn mutation_count_is_case_insensitive() {
        let store = MemoryStore::with_sample_data();
        let tp53 = store.mutation_count_for_gene(&gene("tp53")).await.unwrap();
        assert_eq!(tp53, 4);
        let braf = store.mutation_count_for_gene(&gene("BRAF")).await.unwrap();
        assert_eq!(braf, 0);
    }

    #[tokio::test]
    async fn genes_above_threshold_is_strict() {
        let store = MemoryStore::with_sample_data();
        let genes = store.genes_above_threshold(2).await.unwrap();
        assert_eq!(genes, vec!["KRAS", "TP53"]);
        assert!(store.genes_above_threshold(4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn total_patients_counts_distinct() {
        let store = MemoryStore::with_sample_data();
        assert_eq!(store.total_patients().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn mutation_types_distinct_sorted() {
        let store = MemoryStore::with_sample_data();
        let types = store.mutation_types_for_gene(&gene("TP53")).await.unwrap();
        assert_eq!(
            types,
            vec!["Frame_Shift_Del", "Missense_Mutation", "Nonsense_Mutation"]
        );
    }

    #[tokio::test]
    async fn mrna_expression_not_found() {
        let store = MemoryStore::with_sample_data();
        let egfr = store.mrna_expression(&gene("egfr")).await.unwrap();
        assert!((egfr - 11.07).abs() < 1e-9);

        let err = store.mrna_expression(&gene("ZZZZ")).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::GeneNotFound {
                gene: "ZZZZ".into(),
            }
        );
        assert!(err.is_domain());
    }

    #[tokio::test]
    async fn average_age_skips_missing() {
        let store = MemoryStore::with_sample_data();
        let avg = store.average_age_at_diagnosis().await.unwrap();
        assert!((avg - 380.0 / 6.0).abs() < 1e-9);

        let empty = MemoryStore::new(Dataset::default());
        assert_eq!(empty.average_age_at_diagnosis().await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn stage_distribution_ordered() {
        let store = MemoryStore::with_sample_data();
        let stages = store.patient_count_by_stage().await.unwrap();
        assert_eq!(
            stages,
            vec![
                ("Stage I".to_string(), 3),
                ("Stage II".to_string(), 2),
                ("Stage III".to_string(), 1),
                ("Unknown".to_string(), 1),
            ]
        );
    }
}
