//! Catalogue of the analytical operations the chat front end can run.
//!
//! Each `OperationKind` declares its wire name (the callable form shown to
//! the oracle), the aliases accepted when mapping untrusted names back to a
//! kind, and its required parameters.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed set of supported data operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    TopMutatedGenes,
    LeastMutatedGenes,
    MutationCountForGene,
    GenesAboveThreshold,
    TotalPatients,
    MutationTypesForGene,
    MrnaExpressionForGene,
    AverageAgeAtDiagnosis,
    PatientCountByStage,
}

/// Value type a parameter must coerce to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Integer >= 1.
    PositiveInt,
    /// Any integer (the store decides how to treat non-positive values).
    Int,
    /// Integer >= 0.
    NonNegativeInt,
    /// Gene symbol, upper-cased.
    Gene,
}

/// A declared operation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Canonical parameter name.
    pub name: &'static str,
    pub kind: ParamKind,
    /// Alternative names an oracle may use for this parameter.
    pub aliases: &'static [&'static str],
}

const TOP_N: &[ParamSpec] = &[ParamSpec {
    name: "n",
    kind: ParamKind::PositiveInt,
    aliases: &["top_n", "limit"],
}];

const LEAST_N: &[ParamSpec] = &[ParamSpec {
    name: "n",
    kind: ParamKind::Int,
    aliases: &["top_n", "limit"],
}];

const GENE: &[ParamSpec] = &[ParamSpec {
    name: "gene",
    kind: ParamKind::Gene,
    aliases: &["gene_symbol", "hugo_symbol", "symbol"],
}];

const THRESHOLD: &[ParamSpec] = &[ParamSpec {
    name: "threshold",
    kind: ParamKind::NonNegativeInt,
    aliases: &["x", "count", "min_count"],
}];

impl OperationKind {
    /// Every operation, in prompt order.
    pub const ALL: [OperationKind; 9] = [
        OperationKind::TopMutatedGenes,
        OperationKind::LeastMutatedGenes,
        OperationKind::MutationCountForGene,
        OperationKind::GenesAboveThreshold,
        OperationKind::TotalPatients,
        OperationKind::MutationTypesForGene,
        OperationKind::MrnaExpressionForGene,
        OperationKind::AverageAgeAtDiagnosis,
        OperationKind::PatientCountByStage,
    ];

    /// Snake-case variant name (matches the serde representation).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopMutatedGenes => "top_mutated_genes",
            Self::LeastMutatedGenes => "least_mutated_genes",
            Self::MutationCountForGene => "mutation_count_for_gene",
            Self::GenesAboveThreshold => "genes_above_threshold",
            Self::TotalPatients => "total_patients",
            Self::MutationTypesForGene => "mutation_types_for_gene",
            Self::MrnaExpressionForGene => "mrna_expression_for_gene",
            Self::AverageAgeAtDiagnosis => "average_age_at_diagnosis",
            Self::PatientCountByStage => "patient_count_by_stage",
        }
    }

    /// Callable name used in the oracle prompt and in user-facing errors.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::TopMutatedGenes => "get_top_mutated_genes",
            Self::LeastMutatedGenes => "get_least_mutated_genes",
            Self::MutationCountForGene => "get_mutation_count_for_gene",
            Self::GenesAboveThreshold => "get_genes_with_mutation_count_greater_than",
            Self::TotalPatients => "get_total_patients",
            Self::MutationTypesForGene => "get_mutation_types_for_gene",
            Self::MrnaExpressionForGene => "get_mrna_expression",
            Self::AverageAgeAtDiagnosis => "get_average_age_at_diagnosis",
            Self::PatientCountByStage => "get_patient_count_by_stage",
        }
    }

    /// Extra names accepted from the oracle besides the wire and variant names.
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::MutationCountForGene => &["gene_mutation_count"],
            Self::GenesAboveThreshold => {
                &["genes_with_more_than", "genes_with_mutation_count_above"]
            }
            Self::MutationTypesForGene => &["mutation_types"],
            Self::MrnaExpressionForGene => &["mrna_expression_of"],
            _ => &[],
        }
    }

    /// Required parameters.
    pub fn params(&self) -> &'static [ParamSpec] {
        match self {
            Self::TopMutatedGenes => TOP_N,
            Self::LeastMutatedGenes => LEAST_N,
            Self::MutationCountForGene
            | Self::MutationTypesForGene
            | Self::MrnaExpressionForGene => GENE,
            Self::GenesAboveThreshold => THRESHOLD,
            Self::TotalPatients | Self::AverageAgeAtDiagnosis | Self::PatientCountByStage => &[],
        }
    }

    /// Look up a declared parameter by its canonical name.
    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.params().iter().find(|p| p.name == name)
    }

    /// Callable form, e.g. `get_top_mutated_genes(n)`.
    pub fn signature(&self) -> String {
        let params: Vec<&str> = self.params().iter().map(|p| p.name).collect();
        format!("{}({})", self.wire_name(), params.join(", "))
    }

    /// One-line description shown next to the signature in the prompt.
    pub fn description(&self) -> &'static str {
        match self {
            Self::TopMutatedGenes => "the n genes with the most mutations",
            Self::LeastMutatedGenes => "the n genes with the fewest mutations",
            Self::MutationCountForGene => "number of mutations observed for a gene",
            Self::GenesAboveThreshold => "genes with more than `threshold` mutations",
            Self::TotalPatients => "number of distinct patients with mutation data",
            Self::MutationTypesForGene => "distinct mutation types observed for a gene",
            Self::MrnaExpressionForGene => "mRNA expression value for a gene",
            Self::AverageAgeAtDiagnosis => "average patient age at diagnosis",
            Self::PatientCountByStage => "number of patients in each tumor stage",
        }
    }

    /// Map an untrusted operation name to a kind.
    ///
    /// Matching ignores case, a leading `get_` and any non-alphanumeric
    /// characters, so `TopMutatedGenes`, `top_mutated_genes` and
    /// `get_top_mutated_genes` are equivalent.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return None;
        }
        Self::ALL.into_iter().find(|kind| {
            normalize_name(kind.wire_name()) == wanted
                || normalize_name(kind.as_str()) == wanted
                || kind.aliases().iter().any(|a| normalize_name(a) == wanted)
        })
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

fn normalize_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let stripped = lower.strip_prefix("get_").unwrap_or(&lower);
    stripped
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

impl ParamKind {
    /// Human-readable type name for error messages.
    pub fn expected(&self) -> &'static str {
        match self {
            Self::PositiveInt => "a positive integer",
            Self::Int => "an integer",
            Self::NonNegativeInt => "a non-negative integer",
            Self::Gene => "a gene symbol",
        }
    }

    /// Coerce a JSON value to this kind's representation (type only, no
    /// range check). Integers accept numeric strings and integral floats;
    /// genes accept strings and numbers and are upper-cased.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match self {
            Self::PositiveInt | Self::Int | Self::NonNegativeInt => {
                coerce_int(value).map(Value::from)
            }
            Self::Gene => match value {
                Value::String(s) if !s.trim().is_empty() => {
                    Some(Value::String(s.trim().to_uppercase()))
                }
                Value::Number(n) => Some(Value::String(n.to_string())),
                _ => None,
            },
        }
    }
}

fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            let integral = f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64;
            integral.then_some(f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_name_accepts_wire_names() {
        for kind in OperationKind::ALL {
            assert_eq!(OperationKind::from_name(kind.wire_name()), Some(kind));
        }
    }

    #[test]
    fn from_name_is_case_and_separator_insensitive() {
        assert_eq!(
            OperationKind::from_name("TopMutatedGenes"),
            Some(OperationKind::TopMutatedGenes)
        );
        assert_eq!(
            OperationKind::from_name("GET_TOTAL_PATIENTS"),
            Some(OperationKind::TotalPatients)
        );
        assert_eq!(
            OperationKind::from_name("mrna-expression-for-gene"),
            Some(OperationKind::MrnaExpressionForGene)
        );
    }

    #[test]
    fn from_name_accepts_legacy_aliases() {
        assert_eq!(
            OperationKind::from_name("gene_mutation_count"),
            Some(OperationKind::MutationCountForGene)
        );
        assert_eq!(
            OperationKind::from_name("genes_with_more_than"),
            Some(OperationKind::GenesAboveThreshold)
        );
    }

    #[test]
    fn from_name_rejects_unknown() {
        assert_eq!(OperationKind::from_name("drop_tables"), None);
        assert_eq!(OperationKind::from_name(""), None);
        assert_eq!(OperationKind::from_name("get_"), None);
    }

    #[test]
    fn signatures_list_params() {
        assert_eq!(
            OperationKind::TopMutatedGenes.signature(),
            "get_top_mutated_genes(n)"
        );
        assert_eq!(
            OperationKind::GenesAboveThreshold.signature(),
            "get_genes_with_mutation_count_greater_than(threshold)"
        );
        let total = OperationKind::TotalPatients.signature();
        assert_eq!(total, "get_total_patients()");
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&OperationKind::MrnaExpressionForGene).unwrap();
        assert_eq!(json, r#""mrna_expression_for_gene""#);
    }

    #[test]
    fn coerce_int_from_string_and_float() {
        let kind = ParamKind::PositiveInt;
        assert_eq!(kind.coerce(&json!("5")), Some(json!(5)));
        assert_eq!(kind.coerce(&json!(" 12 ")), Some(json!(12)));
        assert_eq!(kind.coerce(&json!(5.0)), Some(json!(5)));
        assert_eq!(kind.coerce(&json!(5)), Some(json!(5)));
    }

    #[test]
    fn coerce_int_rejects_garbage() {
        let kind = ParamKind::Int;
        assert_eq!(kind.coerce(&json!("five")), None);
        assert_eq!(kind.coerce(&json!(2.5)), None);
        assert_eq!(kind.coerce(&json!(true)), None);
        assert_eq!(kind.coerce(&json!(null)), None);
        assert_eq!(kind.coerce(&json!([1])), None);
    }

    #[test]
    fn coerce_gene_uppercases() {
        assert_eq!(ParamKind::Gene.coerce(&json!("egfr")), Some(json!("EGFR")));
        let padded = json!(" kras ");
        assert_eq!(ParamKind::Gene.coerce(&padded), Some(json!("KRAS")));
        assert_eq!(ParamKind::Gene.coerce(&json!(53)), Some(json!("53")));
        assert_eq!(ParamKind::Gene.coerce(&json!("")), None);
        assert_eq!(ParamKind::Gene.coerce(&json!({})), None);
    }
}
