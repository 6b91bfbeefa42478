//! Oracle prompt built from the operation catalogue.

use cbq_protocol::OperationKind;

/// Worked examples appended to the prompt, as (query, response) pairs.
const EXAMPLES: &[(&str, &str)] = &[
    (
        "Top 5 mutated genes",
        r#"{"tool":"get_top_mutated_genes","args":{"n":5}}"#,
    ),
    (
        "Top 10 least mutated genes",
        r#"{"tool":"get_least_mutated_genes","args":{"n":10}}"#,
    ),
    (
        "Mutation count for EGFR",
        r#"{"tool":"get_mutation_count_for_gene","args":{"gene":"EGFR"}}"#,
    ),
    (
        "Mutation types for TP53",
        r#"{"tool":"get_mutation_types_for_gene","args":{"gene":"TP53"}}"#,
    ),
    (
        "Average age at diagnosis",
        r#"{"tool":"get_average_age_at_diagnosis","args":{}}"#,
    ),
    (
        "Patient count by tumor stage",
        r#"{"tool":"get_patient_count_by_stage","args":{}}"#,
    ),
];

/// Build the full prompt for `query`.
pub fn build_prompt(query: &str) -> String {
    let mut prompt = String::from(
        "You are a data-driven assistant for a lung adenocarcinoma (LUAD) \
         mutation dataset, with these tools:\n",
    );
    for kind in OperationKind::ALL {
        let line = format!("  - {}: {}\n", kind.signature(), kind.description());
        prompt.push_str(&line);
    }

    prompt.push_str(
        "\nFor any user query, choose exactly one tool + args and respond with JSON ONLY:\n\
         {\"tool\":\"<tool_name>\",\"args\":{...}}\n\nExamples:\n",
    );
    for (example, response) in EXAMPLES {
        prompt.push_str(&format!("Query: \"{example}\"\nResponse: {response}\n\n"));
    }

    prompt.push_str("IMPORTANT: Output only the JSON object, nothing else.\n\n");
    prompt.push_str(query);
    prompt.push('\n');
    prompt
}
