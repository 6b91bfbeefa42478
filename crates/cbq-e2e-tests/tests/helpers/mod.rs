//! Shared test harness for E2E scenario tests.
//!
//! Wires the real pattern resolver, oracle resolver, dispatcher, handler and
//! conversation loop together over a scripted store and a scripted oracle.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use cbq_chat::dispatcher::IntentDispatcher;
use cbq_chat::handler::QueryHandler;
use cbq_chat::repl;
use cbq_protocol::{Query, Reply};
use cbq_resolver::{
    IntentResolver, OracleError, OracleResolver, PatternResolver, TextOracle, TieredResolver,
};
use cbq_store::{MockStore, MutationStore};

/// Oracle that always answers with the same text and counts invocations.
pub struct ScriptedOracle {
    reply: String,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl TextOracle for ScriptedOracle {
    async fn invoke(
        &self,
        _prompt: &str,
        _query: &str,
        _timeout: Duration,
    ) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// The LUAD numbers used throughout the scenarios.
pub fn luad_store() -> MockStore {
    MockStore::new()
        .with_genes(&["TP53", "EGFR", "KRAS", "STK11", "BRAF"])
        .with_mutation_count("TP53", 230)
        .with_mutation_count("EGFR", 42)
        .with_mutation_count("KRAS", 40)
        .with_mutation_count("STK11", 25)
        .with_mutation_count("BRAF", 12)
        .with_total_patients(500)
        .with_mutation_types("TP53", &["Missense_Mutation", "Nonsense_Mutation"])
        .with_expression("TP53", 812.5)
        .with_average_age(65.4)
        .with_stages(&[("I", 120), ("II", 80)])
}

/// End-to-end harness: one store, one tiered resolver.
pub struct TestHarness<S: MutationStore = MockStore> {
    pub store: S,
    pub resolver: TieredResolver,
    oracle_calls: Arc<AtomicUsize>,
}

impl TestHarness<MockStore> {
    /// LUAD store; the oracle replies with prose that contains no intent.
    pub fn new() -> Self {
        Self::with_oracle_reply("I'm not sure which tool fits that question.")
    }

    /// LUAD store; the oracle always replies with `reply`.
    pub fn with_oracle_reply(reply: &str) -> Self {
        Self::with_store_and_reply(luad_store(), reply)
    }
}

impl<S: MutationStore> TestHarness<S> {
    pub fn with_store_and_reply(store: S, reply: &str) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let oracle = ScriptedOracle {
            reply: reply.to_string(),
            calls: calls.clone(),
        };
        let oracle = OracleResolver::new(Box::new(oracle), Duration::from_secs(5));
        let resolver = TieredResolver::new(Box::new(PatternResolver::new()), Box::new(oracle));
        Self {
            store,
            resolver,
            oracle_calls: calls,
        }
    }

    /// Harness with an arbitrary oracle resolver (real transports).
    pub fn with_oracle(store: S, oracle: OracleResolver) -> Self {
        Self {
            store,
            resolver: TieredResolver::new(Box::new(PatternResolver::new()), Box::new(oracle)),
            oracle_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle a single query through the full pipeline.
    pub async fn ask(&self, text: &str) -> Reply {
        let resolver: &dyn IntentResolver = &self.resolver;
        let handler = QueryHandler::new(resolver, IntentDispatcher::new(&self.store));
        handler.handle(&Query::new(text)).await
    }

    /// Run the conversation loop over `input` and return everything printed.
    pub async fn converse(&self, input: &str) -> String {
        let resolver: &dyn IntentResolver = &self.resolver;
        let handler = QueryHandler::new(resolver, IntentDispatcher::new(&self.store));
        let mut output = Vec::new();
        repl::run(&handler, input.as_bytes(), &mut output)
            .await
            .expect("in-memory I/O cannot fail");
        String::from_utf8(output).expect("replies are UTF-8")
    }

    /// Number of times the scripted oracle was invoked.
    pub fn oracle_calls(&self) -> usize {
        self.oracle_calls.load(Ordering::SeqCst)
    }
}
