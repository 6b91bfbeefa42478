//! Intent dispatcher: validates an intent, runs it, formats the result.
//!
//! The store is only ever called with a typed `Operation`; an intent whose
//! arguments do not validate never reaches it.

use cbq_protocol::{Intent, Operation, QueryOutput, Reply, ReplyStatus};
use cbq_store::{MutationStore, StoreResult};

use crate::format;

/// Reply text when no resolver produced an intent.
pub const NO_MATCH_MESSAGE: &str = "Sorry, I couldn't find a matching operation for that query.";

/// Dispatches intents against a `MutationStore`.
pub struct IntentDispatcher<'a> {
    store: &'a dyn MutationStore,
}

impl<'a> IntentDispatcher<'a> {
    pub fn new(store: &'a dyn MutationStore) -> Self {
        Self { store }
    }

    /// Produce the reply for a (possibly absent) intent.
    pub async fn dispatch(&self, intent: Option<&Intent>) -> Reply {
        let Some(intent) = intent else {
            return Reply::new(ReplyStatus::Unrecognized, None, NO_MATCH_MESSAGE);
        };
        let kind = intent.operation;

        let operation = match intent.validate() {
            Ok(op) => op,
            Err(e) => {
                tracing::info!(
                    operation = %kind,
                    param = e.param(),
                    error = %e,
                    "intent rejected"
                );
                return Reply::new(ReplyStatus::Invalid, Some(kind), format!("Error: {e}"));
            }
        };

        match self.run(&operation).await {
            Ok(output) => Reply::new(ReplyStatus::Answered, Some(kind), format::render(&output)),
            Err(e) => {
                if e.is_domain() {
                    tracing::warn!(operation = %kind, error = %e, "no data for request");
                } else {
                    tracing::error!(operation = %kind, error = %e, "data store failure");
                }
                let text = format!("Error ({kind}): {e}");
                Reply::new(ReplyStatus::Failed, Some(kind), text)
            }
        }
    }

    /// Run a validated operation against the store.
    pub async fn run(&self, operation: &Operation) -> StoreResult<QueryOutput> {
        let store = self.store;
        let output = match operation {
            Operation::TopMutatedGenes { n } => {
                QueryOutput::Names(store.top_mutated_genes(*n).await?)
            }
            Operation::LeastMutatedGenes { n } => {
                QueryOutput::Names(store.least_mutated_genes(*n).await?)
            }
            Operation::MutationCountForGene { gene } => {
                QueryOutput::Count(store.mutation_count_for_gene(gene).await?)
            }
            Operation::GenesAboveThreshold { threshold } => {
                QueryOutput::Names(store.genes_above_threshold(*threshold).await?)
            }
            Operation::TotalPatients => QueryOutput::Count(store.total_patients().await?),
            Operation::MutationTypesForGene { gene } => {
                QueryOutput::Names(store.mutation_types_for_gene(gene).await?)
            }
            Operation::MrnaExpressionForGene { gene } => {
                QueryOutput::Value(store.mrna_expression(gene).await?)
            }
            Operation::AverageAgeAtDiagnosis => {
                QueryOutput::Value(store.average_age_at_diagnosis().await?)
            }
            Operation::PatientCountByStage => {
                QueryOutput::Distribution(store.patient_count_by_stage().await?)
            }
        };
        Ok(output)
    }
}
