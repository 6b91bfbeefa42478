//! Pattern resolver: anchored lexical templates for the common phrasings.
//!
//! Sub-millisecond and deterministic. Anything it cannot match falls through
//! to the oracle.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use cbq_protocol::{Intent, OperationKind, ResolverTier};

use crate::{IntentResolver, Resolution};

// Templates are matched against the lower-cased text and anchored at the
// start only; trailing text ("... in luad?") is ignored.
static TOP_LEAST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^top\s+(\d+)\s+least mutated genes").unwrap());
static TOP_MUTATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^top\s+(\d+)\s+mutated genes").unwrap());
static MUTATION_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^mutation count for (\w+)").unwrap());
static MORE_THAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^genes with more than\s+(\d+)\s+mutations").unwrap());
static MUTATION_TYPES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^mutation types for (\w+)").unwrap());
static MRNA_EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^mrna expression of (\w+)").unwrap());

const STAGE_PHRASES: &[&str] = &[
    "patient count by tumor stage",
    "patients in each tumor stage",
];

/// Template-based resolver.
pub struct PatternResolver;

impl PatternResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PatternResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IntentResolver for PatternResolver {
    async fn resolve(&self, text: &str) -> Option<Resolution> {
        resolve_text(text).map(|intent| Resolution {
            intent,
            tier: ResolverTier::Pattern,
        })
    }

    fn tier_name(&self) -> &str {
        "pattern"
    }
}

/// Core template matching. Order matters: the first matching template wins.
pub fn resolve_text(text: &str) -> Option<Intent> {
    let lower = text.to_lowercase();
    let lower = lower.trim();

    // ── Gene rankings ───────────────────────────────────────────

    if let Some(n) = capture_int(&TOP_LEAST, lower) {
        let intent = Intent::new(OperationKind::LeastMutatedGenes);
        return Some(intent.with_arg("n", n));
    }

    if let Some(n) = capture_int(&TOP_MUTATED, lower) {
        let intent = Intent::new(OperationKind::TopMutatedGenes);
        return Some(intent.with_arg("n", n));
    }

    if let Some(gene) = capture_gene(&MUTATION_COUNT, lower) {
        let intent = Intent::new(OperationKind::MutationCountForGene);
        return Some(intent.with_arg("gene", gene));
    }

    if let Some(threshold) = capture_int(&MORE_THAN, lower) {
        let intent = Intent::new(OperationKind::GenesAboveThreshold);
        return Some(intent.with_arg("threshold", threshold));
    }

    // ── Cohort summaries ────────────────────────────────────────

    if lower.contains("how many patients") {
        return Some(Intent::new(OperationKind::TotalPatients));
    }

    if lower.contains("average age at diagnosis") {
        return Some(Intent::new(OperationKind::AverageAgeAtDiagnosis));
    }

    if matches_any(lower, STAGE_PHRASES) {
        return Some(Intent::new(OperationKind::PatientCountByStage));
    }

    // ── Per-gene lookups ────────────────────────────────────────

    if let Some(gene) = capture_gene(&MUTATION_TYPES, lower) {
        let intent = Intent::new(OperationKind::MutationTypesForGene);
        return Some(intent.with_arg("gene", gene));
    }

    if let Some(gene) = capture_gene(&MRNA_EXPRESSION, lower) {
        let intent = Intent::new(OperationKind::MrnaExpressionForGene);
        return Some(intent.with_arg("gene", gene));
    }

    None
}

/// Check if text contains any of the given patterns.
fn matches_any(text: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| text.contains(p))
}

/// First capture group as an integer. Overflow counts as no match.
fn capture_int(re: &Regex, text: &str) -> Option<i64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// First capture group as an upper-cased gene symbol.
fn capture_gene(re: &Regex, text: &str) -> Option<String> {
    Some(re.captures(text)?.get(1)?.as_str().to_uppercase())
}
