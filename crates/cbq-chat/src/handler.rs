//! Per-turn query handling: resolve, dispatch, stamp the reply.

use std::time::Instant;

use cbq_protocol::{Query, Reply};
use cbq_resolver::IntentResolver;

use crate::dispatcher::IntentDispatcher;

/// Resolves a query and dispatches the resulting intent.
pub struct QueryHandler<'a> {
    resolver: &'a dyn IntentResolver,
    dispatcher: IntentDispatcher<'a>,
}

impl<'a> QueryHandler<'a> {
    pub fn new(resolver: &'a dyn IntentResolver, dispatcher: IntentDispatcher<'a>) -> Self {
        Self {
            resolver,
            dispatcher,
        }
    }

    /// Handle one query. Never fails; every outcome is a reply.
    pub async fn handle(&self, query: &Query) -> Reply {
        let start = Instant::now();
        let text = query.cleaned();

        let resolution = self.resolver.resolve(text).await;
        let tier = resolution.as_ref().map(|r| r.tier);
        let mut reply = self
            .dispatcher
            .dispatch(resolution.as_ref().map(|r| &r.intent))
            .await;

        reply.query_id = Some(query.id);
        reply.tier = tier;
        reply.received_at = Some(query.received_at);
        reply.latency_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            query_id = %query.id,
            received_at = %query.received_at,
            status = ?reply.status,
            operation = ?reply.operation,
            tier = ?reply.tier,
            latency_ms = reply.latency_ms,
            "query handled"
        );
        reply
    }
}
