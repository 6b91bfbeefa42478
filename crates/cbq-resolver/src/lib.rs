//! Natural-language query resolution.
//!
//! Converts user text ("top 5 mutated genes", "mrna expression of TP53")
//! into a structured `Intent`.
//!
//! Two tiers:
//! - **Pattern** (local): anchored lexical templates, deterministic and free.
//! - **Oracle**: an Ollama model prompted with the operation catalogue, used
//!   only when no template matches. Its output is untrusted.

pub mod oracle;
pub mod pattern;
pub mod payload;
pub mod prompt;
pub mod tiered;

use async_trait::async_trait;
use cbq_protocol::{Intent, ResolverTier};

/// An intent together with the tier that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub intent: Intent,
    pub tier: ResolverTier,
}

/// Trait for resolvers that map text to an intent.
#[async_trait]
pub trait IntentResolver: Send + Sync {
    /// Resolve text into an intent. Returns None if the resolver cannot
    /// map the input; resolvers never fail loudly.
    async fn resolve(&self, text: &str) -> Option<Resolution>;

    /// Name of this resolver (for logging).
    fn tier_name(&self) -> &str;
}

pub use oracle::{
    OllamaCliOracle, OllamaHttpOracle, OracleConfig, OracleError, OracleResolver, OracleTransport,
    TextOracle,
};
pub use pattern::PatternResolver;
pub use tiered::TieredResolver;
