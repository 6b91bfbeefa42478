//! Tiered resolver: patterns first, oracle fallback.
//!
//! Tries the local (pattern) resolver first. If it returns `None`, falls
//! back to the oracle, when one is configured. The tier that produced the
//! result is recorded in `Resolution::tier`.

use async_trait::async_trait;

use crate::{IntentResolver, Resolution};

/// Composite resolver that tries local resolution first, then the fallback.
pub struct TieredResolver {
    local: Box<dyn IntentResolver>,
    fallback: Option<Box<dyn IntentResolver>>,
}

impl TieredResolver {
    pub fn new(local: Box<dyn IntentResolver>, fallback: Box<dyn IntentResolver>) -> Self {
        Self {
            local,
            fallback: Some(fallback),
        }
    }

    /// Resolver without a fallback tier (oracle disabled).
    pub fn local_only(local: Box<dyn IntentResolver>) -> Self {
        Self {
            local,
            fallback: None,
        }
    }
}

#[async_trait]
impl IntentResolver for TieredResolver {
    async fn resolve(&self, text: &str) -> Option<Resolution> {
        if let Some(result) = self.local.resolve(text).await {
            return Some(result);
        }

        let fallback = self.fallback.as_ref()?;
        tracing::debug!(
            local = self.local.tier_name(),
            fallback = fallback.tier_name(),
            "local resolution missed, falling back"
        );
        fallback.resolve(text).await
    }

    fn tier_name(&self) -> &str {
        "tiered"
    }
}
