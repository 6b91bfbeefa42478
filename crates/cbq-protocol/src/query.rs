//! Per-turn request and reply types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::operations::OperationKind;

/// A single line of user input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// Unique query ID (UUIDv7 for time-sortability).
    pub id: Uuid,
    /// Raw text as typed.
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            text: text.into(),
            received_at: Utc::now(),
        }
    }

    /// Text with any echoed prompt characters (`>`) and surrounding
    /// whitespace removed.
    pub fn cleaned(&self) -> &str {
        self.text
            .trim_start_matches(|c: char| c == '>' || c.is_whitespace())
            .trim()
    }
}

/// Which resolver produced the intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverTier {
    /// Deterministic lexical templates.
    Pattern,
    /// External natural-language oracle.
    Oracle,
}

impl ResolverTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::Oracle => "oracle",
        }
    }
}

impl std::fmt::Display for ResolverTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    /// The operation ran and produced a result.
    Answered,
    /// No resolver produced an intent.
    Unrecognized,
    /// An intent was resolved but its arguments were rejected.
    Invalid,
    /// The data layer reported a failure.
    Failed,
}

/// Printable response for one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_id: Option<Uuid>,
    pub status: ReplyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<OperationKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<ResolverTier>,
    /// When the originating query was read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_at: Option<DateTime<Utc>>,
    /// User-facing text.
    pub text: String,
    /// Processing latency in milliseconds.
    pub latency_ms: u64,
}

impl Reply {
    pub fn new(
        status: ReplyStatus,
        operation: Option<OperationKind>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            query_id: None,
            status,
            operation,
            tier: None,
            received_at: None,
            text: text.into(),
            latency_ms: 0,
        }
    }
}
