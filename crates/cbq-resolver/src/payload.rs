//! Validation of untrusted oracle output into an `Intent`.
//!
//! The oracle is asked for `{"tool": ..., "args": {...}}` but may wrap it in
//! prose, vary key case, use other key names or send numbers as strings.
//! Everything here is lenient on shape and strict on content: an unknown
//! operation or an argument of the wrong type rejects the whole payload.

use serde_json::{Map, Value};
use thiserror::Error;

use cbq_protocol::{Arguments, Intent, OperationKind, ParamSpec};

/// Keys accepted for the operation name.
const OPERATION_KEYS: &[&str] = &["tool", "operation", "tool_name"];

/// Keys accepted for the argument object.
const ARGS_KEYS: &[&str] = &["args", "arguments", "tool_args"];

/// Why an oracle payload was rejected.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("oracle output is empty")]
    Empty,

    #[error("no JSON object in oracle output")]
    NoObject,

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload has no operation name")]
    MissingOperation,

    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("arguments are not an object")]
    ArgumentsNotObject,

    #[error("argument `{param}` has the wrong type: {value}")]
    InvalidArgument { param: &'static str, value: Value },
}

/// Slice from the first `{` to the last `}` (inclusive).
pub fn extract_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

/// Parse raw oracle text into an intent.
///
/// Only the declared parameters of the operation are kept (mapped from
/// their aliases and coerced by kind); anything else is dropped. Missing
/// parameters are left missing for the dispatcher to report.
pub fn parse_intent(raw: &str) -> Result<Intent, PayloadError> {
    if raw.trim().is_empty() {
        return Err(PayloadError::Empty);
    }
    let json = extract_object(raw).ok_or(PayloadError::NoObject)?;
    let object = match serde_json::from_str::<Value>(json)? {
        Value::Object(map) => lowercase_keys(map),
        _ => return Err(PayloadError::NoObject),
    };

    let name = first_of(&object, OPERATION_KEYS)
        .and_then(Value::as_str)
        .ok_or(PayloadError::MissingOperation)?;
    let operation = OperationKind::from_name(name)
        .ok_or_else(|| PayloadError::UnknownOperation(name.to_string()))?;

    let raw_args = match first_of(&object, ARGS_KEYS) {
        None => Map::new(),
        Some(Value::Object(map)) => lowercase_keys(map.clone()),
        Some(_) => return Err(PayloadError::ArgumentsNotObject),
    };

    let mut args = Arguments::new();
    for spec in operation.params() {
        let Some(value) = lookup_param(&raw_args, spec) else {
            continue;
        };
        let coerced = spec
            .kind
            .coerce(value)
            .ok_or_else(|| PayloadError::InvalidArgument {
                param: spec.name,
                value: value.clone(),
            })?;
        args.insert(spec.name.to_string(), coerced);
    }

    Ok(Intent { operation, args })
}

fn lowercase_keys(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(k, v)| (k.to_lowercase(), v))
        .collect()
}

/// First key of `keys`, in order, holding a non-null value.
fn first_of<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| object.get(*k))
        .find(|v| !v.is_null())
}

/// Value for a parameter under its canonical name or any alias. Nulls count
/// as absent.
fn lookup_param<'a>(args: &'a Map<String, Value>, spec: &ParamSpec) -> Option<&'a Value> {
    std::iter::once(spec.name)
        .chain(spec.aliases.iter().copied())
        .filter_map(|k| args.get(k))
        .find(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── extract_object ───────────────────────────────────────────

    #[test]
    fn extract_object_raw() {
        let input = r#"{"tool":"get_total_patients","args":{}}"#;
        assert_eq!(extract_object(input), Some(input));
    }

    #[test]
    fn extract_object_with_surrounding_text() {
        let input = "Sure! Here you go:\n```json\n{\"tool\":\"x\"}\n```\nDone.";
        assert_eq!(extract_object(input), Some("{\"tool\":\"x\"}"));
    }

    #[test]
    fn extract_object_missing_braces() {
        assert_eq!(extract_object("no json here"), None);
        assert_eq!(extract_object("} backwards {"), None);
    }

    // ── parse_intent ─────────────────────────────────────────────

    #[test]
    fn parses_canonical_payload() {
        let raw = r#"{"tool":"get_top_mutated_genes","args":{"n":5}}"#;
        let intent = parse_intent(raw).unwrap();
        assert_eq!(intent.operation, OperationKind::TopMutatedGenes);
        assert_eq!(intent.arg("n"), Some(&json!(5)));
    }

    #[test]
    fn numeric_string_equals_number() {
        let a = parse_intent(r#"{"tool":"get_top_mutated_genes","args":{"n":"5"}}"#).unwrap();
        let b = parse_intent(r#"{"tool":"get_top_mutated_genes","args":{"n":5}}"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn keys_are_case_insensitive() {
        let raw = r#"{"TOOL":"get_mutation_count_for_gene","Args":{"GENE":"egfr"}}"#;
        let intent = parse_intent(raw).unwrap();
        assert_eq!(intent.operation, OperationKind::MutationCountForGene);
        assert_eq!(intent.arg("gene"), Some(&json!("EGFR")));
    }

    #[test]
    fn alternative_key_names() {
        let raw = r#"{"tool_name":"genes_with_more_than","tool_args":{"count":"20"}}"#;
        let intent = parse_intent(raw).unwrap();
        assert_eq!(intent.operation, OperationKind::GenesAboveThreshold);
        assert_eq!(intent.arg("threshold"), Some(&json!(20)));
    }

    #[test]
    fn null_operation_key_falls_through_to_next() {
        let raw = r#"{"tool":null,"operation":"get_total_patients"}"#;
        let intent = parse_intent(raw).unwrap();
        assert_eq!(intent.operation, OperationKind::TotalPatients);

        let raw = r#"{"args":null,"arguments":{"n":4},"tool":"get_top_mutated_genes"}"#;
        let intent = parse_intent(raw).unwrap();
        assert_eq!(intent.arg("n"), Some(&json!(4)));
    }

    #[test]
    fn legacy_x_alias_maps_to_threshold() {
        let raw = r#"{"tool":"get_genes_with_mutation_count_greater_than","args":{"x":3}}"#;
        let intent = parse_intent(raw).unwrap();
        assert_eq!(intent.arg("threshold"), Some(&json!(3)));
    }

    #[test]
    fn undeclared_arguments_are_dropped() {
        let raw = r#"{"tool":"get_total_patients","args":{"cancer_type":"LUAD","n":3}}"#;
        let intent = parse_intent(raw).unwrap();
        assert!(intent.args.is_empty());
    }

    #[test]
    fn missing_args_object_is_empty() {
        let intent = parse_intent(r#"{"tool":"get_top_mutated_genes"}"#).unwrap();
        assert!(intent.args.is_empty());
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert!(matches!(parse_intent("   "), Err(PayloadError::Empty)));
        let prose = parse_intent("I like turtles");
        assert!(matches!(prose, Err(PayloadError::NoObject)));
        let broken = parse_intent("{not json}");
        assert!(matches!(broken, Err(PayloadError::Json(_))));
    }

    #[test]
    fn rejects_unknown_or_null_operation() {
        assert!(matches!(
            parse_intent(r#"{"tool":"drop_all_tables","args":{}}"#),
            Err(PayloadError::UnknownOperation(name)) if name == "drop_all_tables"
        ));
        assert!(matches!(
            parse_intent(r#"{"tool":null,"args":{}}"#),
            Err(PayloadError::MissingOperation)
        ));
        assert!(matches!(
            parse_intent(r#"{"args":{"n":5}}"#),
            Err(PayloadError::MissingOperation)
        ));
    }

    #[test]
    fn rejects_wrong_argument_type() {
        let raw = r#"{"tool":"get_top_mutated_genes","args":{"n":"five"}}"#;
        let err = parse_intent(raw).unwrap_err();
        let expected_param = matches!(err, PayloadError::InvalidArgument { param: "n", .. });
        assert!(expected_param);

        let err = parse_intent(r#"{"tool":"get_top_mutated_genes","args":[5]}"#).unwrap_err();
        assert!(matches!(err, PayloadError::ArgumentsNotObject));
    }
}
