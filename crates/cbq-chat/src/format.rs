//! Rendering of query results as reply text.

use cbq_protocol::QueryOutput;

/// Text shown for an empty list or distribution.
pub const EMPTY_LIST: &str = "(none)";

/// Render a result for display.
pub fn render(output: &QueryOutput) -> String {
    match output {
        QueryOutput::Count(n) => n.to_string(),
        QueryOutput::Value(v) => render_float(*v),
        QueryOutput::Names(names) if names.is_empty() => EMPTY_LIST.to_string(),
        QueryOutput::Distribution(pairs) if pairs.is_empty() => EMPTY_LIST.to_string(),
        QueryOutput::Names(names) => names.join(", "),
        QueryOutput::Distribution(pairs) => pairs
            .iter()
            .map(|(key, count)| format!("{key}: {count}"))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Shortest decimal form, with at least one fractional digit.
fn render_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}
