//! Values returned by data operations.

use serde::{Deserialize, Serialize};

/// Outcome of a successful data operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum QueryOutput {
    /// Integer scalar (counts).
    Count(i64),
    /// Floating-point scalar (expression values, averages).
    Value(f64),
    /// Ordered sequence of names (genes, mutation types).
    Names(Vec<String>),
    /// Category → count pairs, in stored order.
    Distribution(Vec<(String, i64)>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_tagged() {
        let out = QueryOutput::Names(vec!["TP53".into()]);
        let json = serde_json::to_string(&out).unwrap();
        assert_eq!(json, r#"{"type":"names","value":["TP53"]}"#);
    }

    #[test]
    fn distribution_keeps_order() {
        let out = QueryOutput::Distribution(vec![("II".into(), 80), ("I".into(), 120)]);
        let json = serde_json::to_string(&out).unwrap();
        let back: QueryOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back, out);
    }
}
