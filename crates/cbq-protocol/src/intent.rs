//! Resolved intents and their validation into typed operations.
//!
//! Resolvers produce an `Intent` (operation kind + loosely typed argument
//! map). The dispatcher only ever runs an `Operation`, which can only be
//! obtained through `Intent::validate`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::operations::{OperationKind, ParamKind};

/// Argument map attached to an intent, keyed by canonical parameter name.
pub type Arguments = serde_json::Map<String, Value>;

/// A resolved (operation, arguments) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub operation: OperationKind,
    #[serde(default)]
    pub args: Arguments,
}

impl Intent {
    pub fn new(operation: OperationKind) -> Self {
        Self {
            operation,
            args: Arguments::new(),
        }
    }

    /// Builder-style argument setter.
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }

    /// Check the arguments against the operation's parameter contract and
    /// build the typed operation.
    pub fn validate(&self) -> Result<Operation, ValidationError> {
        let op = match self.operation {
            OperationKind::TopMutatedGenes => Operation::TopMutatedGenes {
                n: self.positive_int("n")?,
            },
            OperationKind::LeastMutatedGenes => Operation::LeastMutatedGenes { n: self.int("n")? },
            OperationKind::MutationCountForGene => Operation::MutationCountForGene {
                gene: self.gene("gene")?,
            },
            OperationKind::GenesAboveThreshold => Operation::GenesAboveThreshold {
                threshold: self.non_negative_int("threshold")?,
            },
            OperationKind::TotalPatients => Operation::TotalPatients,
            OperationKind::MutationTypesForGene => Operation::MutationTypesForGene {
                gene: self.gene("gene")?,
            },
            OperationKind::MrnaExpressionForGene => Operation::MrnaExpressionForGene {
                gene: self.gene("gene")?,
            },
            OperationKind::AverageAgeAtDiagnosis => Operation::AverageAgeAtDiagnosis,
            OperationKind::PatientCountByStage => Operation::PatientCountByStage,
        };
        Ok(op)
    }

    fn require(&self, param: &'static str) -> Result<&Value, ValidationError> {
        self.args.get(param).ok_or(ValidationError::Missing {
            operation: self.operation,
            param,
        })
    }

    fn invalid(&self, param: &'static str, kind: ParamKind, got: &Value) -> ValidationError {
        ValidationError::Invalid {
            operation: self.operation,
            param,
            expected: kind.expected(),
            got: got.to_string(),
        }
    }

    fn int(&self, param: &'static str) -> Result<i64, ValidationError> {
        let raw = self.require(param)?;
        ParamKind::Int
            .coerce(raw)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| self.invalid(param, ParamKind::Int, raw))
    }

    fn positive_int(&self, param: &'static str) -> Result<u32, ValidationError> {
        let raw = self.require(param)?;
        ParamKind::PositiveInt
            .coerce(raw)
            .and_then(|v| v.as_i64())
            .filter(|n| *n >= 1)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| self.invalid(param, ParamKind::PositiveInt, raw))
    }

    fn non_negative_int(&self, param: &'static str) -> Result<u64, ValidationError> {
        let raw = self.require(param)?;
        ParamKind::NonNegativeInt
            .coerce(raw)
            .and_then(|v| v.as_i64())
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| self.invalid(param, ParamKind::NonNegativeInt, raw))
    }

    fn gene(&self, param: &'static str) -> Result<GeneSymbol, ValidationError> {
        let raw = self.require(param)?;
        ParamKind::Gene
            .coerce(raw)
            .as_ref()
            .and_then(Value::as_str)
            .and_then(GeneSymbol::parse)
            .ok_or_else(|| self.invalid(param, ParamKind::Gene, raw))
    }
}

/// A validated, typed data operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Operation {
    TopMutatedGenes { n: u32 },
    /// `n <= 0` is passed through; the store substitutes its default.
    LeastMutatedGenes { n: i64 },
    MutationCountForGene { gene: GeneSymbol },
    GenesAboveThreshold { threshold: u64 },
    TotalPatients,
    MutationTypesForGene { gene: GeneSymbol },
    MrnaExpressionForGene { gene: GeneSymbol },
    AverageAgeAtDiagnosis,
    PatientCountByStage,
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::TopMutatedGenes { .. } => OperationKind::TopMutatedGenes,
            Self::LeastMutatedGenes { .. } => OperationKind::LeastMutatedGenes,
            Self::MutationCountForGene { .. } => OperationKind::MutationCountForGene,
            Self::GenesAboveThreshold { .. } => OperationKind::GenesAboveThreshold,
            Self::TotalPatients => OperationKind::TotalPatients,
            Self::MutationTypesForGene { .. } => OperationKind::MutationTypesForGene,
            Self::MrnaExpressionForGene { .. } => OperationKind::MrnaExpressionForGene,
            Self::AverageAgeAtDiagnosis => OperationKind::AverageAgeAtDiagnosis,
            Self::PatientCountByStage => OperationKind::PatientCountByStage,
        }
    }
}

/// Maximum accepted gene symbol length.
const MAX_GENE_LEN: usize = 32;

/// Upper-cased gene symbol: non-empty, ASCII alphanumerics plus `.`, `-`, `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneSymbol(String);

impl GeneSymbol {
    pub fn parse(raw: &str) -> Option<Self> {
        let symbol = raw.trim();
        let valid = !symbol.is_empty()
            && symbol.len() <= MAX_GENE_LEN
            && symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        valid.then(|| Self(symbol.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GeneSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why an intent's arguments do not satisfy its operation's contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required parameter `{param}` for {operation}")]
    Missing {
        operation: OperationKind,
        param: &'static str,
    },

    #[error("invalid parameter `{param}` for {operation}: expected {expected}, got {got}")]
    Invalid {
        operation: OperationKind,
        param: &'static str,
        expected: &'static str,
        got: String,
    },
}

impl ValidationError {
    pub fn param(&self) -> &'static str {
        match self {
            Self::Missing { param, .. } | Self::Invalid { param, .. } => param,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validate_top_mutated_genes() {
        let intent = Intent::new(OperationKind::TopMutatedGenes).with_arg("n", 5);
        assert_eq!(intent.validate(), Ok(Operation::TopMutatedGenes { n: 5 }));
    }

    #[test]
    fn validate_accepts_numeric_string() {
        let a = Intent::new(OperationKind::TopMutatedGenes).with_arg("n", "5");
        let b = Intent::new(OperationKind::TopMutatedGenes).with_arg("n", 5);
        assert_eq!(a.validate(), b.validate());
    }

    #[test]
    fn validate_missing_param() {
        let intent = Intent::new(OperationKind::TopMutatedGenes);
        let err = intent.validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::Missing {
                operation: OperationKind::TopMutatedGenes,
                param: "n",
            }
        );
        assert!(err.to_string().contains("`n`"));
        assert!(err.to_string().contains("get_top_mutated_genes"));
    }

    #[test]
    fn every_declared_param_is_required() {
        for kind in OperationKind::ALL {
            for spec in kind.params() {
                let err = Intent::new(kind).validate().unwrap_err();
                assert_eq!(err.param(), spec.name, "{kind}");
            }
        }
    }

    #[test]
    fn parameterless_operations_validate_empty() {
        assert_eq!(
            Intent::new(OperationKind::TotalPatients).validate(),
            Ok(Operation::TotalPatients)
        );
        assert_eq!(
            Intent::new(OperationKind::PatientCountByStage).validate(),
            Ok(Operation::PatientCountByStage)
        );
    }

    #[test]
    fn top_n_must_be_positive() {
        let intent = Intent::new(OperationKind::TopMutatedGenes).with_arg("n", 0);
        let err = intent.validate().unwrap_err();
        assert!(matches!(err, ValidationError::Invalid { param: "n", .. }));
        assert!(err.to_string().contains("positive integer"));
    }

    #[test]
    fn least_n_passes_non_positive_through() {
        let intent = Intent::new(OperationKind::LeastMutatedGenes).with_arg("n", -3);
        let expected = Operation::LeastMutatedGenes { n: -3 };
        assert_eq!(intent.validate(), Ok(expected));
    }

    #[test]
    fn threshold_must_be_non_negative() {
        let ok = Intent::new(OperationKind::GenesAboveThreshold).with_arg("threshold", 0);
        assert_eq!(
            ok.validate(),
            Ok(Operation::GenesAboveThreshold { threshold: 0 })
        );

        let bad = Intent::new(OperationKind::GenesAboveThreshold).with_arg("threshold", -1);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn gene_is_uppercased() {
        let intent = Intent::new(OperationKind::MutationCountForGene).with_arg("gene", "egfr");
        let Operation::MutationCountForGene { gene } = intent.validate().unwrap() else {
            panic!("wrong operation");
        };
        assert_eq!(gene.as_str(), "EGFR");
    }

    #[test]
    fn gene_rejects_injection_characters() {
        let intent = Intent::new(OperationKind::MrnaExpressionForGene)
            .with_arg("gene", "TP53'; DROP TABLE mutations; --");
        let err = intent.validate().unwrap_err();
        assert_eq!(err.param(), "gene");
    }

    #[test]
    fn wrong_type_reports_value() {
        let intent = Intent::new(OperationKind::TopMutatedGenes).with_arg("n", json!([5]));
        let err = intent.validate().unwrap_err();
        assert!(err.to_string().contains("[5]"));
    }

    #[test]
    fn operation_kind_roundtrip() {
        for kind in OperationKind::ALL {
            let mut intent = Intent::new(kind);
            for spec in kind.params() {
                let value = match spec.kind {
                    ParamKind::Gene => json!("KRAS"),
                    _ => json!(3),
                };
                intent = intent.with_arg(spec.name, value);
            }
            assert_eq!(intent.validate().unwrap().kind(), kind);
        }
    }

    #[test]
    fn gene_symbol_parse() {
        assert_eq!(GeneSymbol::parse("hla-a").unwrap().as_str(), "HLA-A");
        assert!(GeneSymbol::parse("  ").is_none());
        assert!(GeneSymbol::parse("a b").is_none());
        assert!(GeneSymbol::parse(&"A".repeat(33)).is_none());
    }
}
