//! Fuzzy similarity metrics over step sequences and structured contexts.

use augur_core::models::WorkflowContext;

// Attribute weights for context similarity. Document type dominates; the
// metadata overlap catches everything unstructured.
const W_DOCUMENT_TYPE: f64 = 0.30;
const W_AGENCY: f64 = 0.20;
const W_VALUE: f64 = 0.20;
const W_COMPLEXITY: f64 = 0.10;
const W_TIMELINE: f64 = 0.10;
const W_METADATA: f64 = 0.10;

/// Longest-common-subsequence ratio between two step sequences, in [0, 1].
/// An exact match scores 1.0; two empty sequences count as identical.
pub fn sequence_similarity(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let lcs = lcs_length(a, b) as f64;
    lcs / a.len().max(b.len()) as f64
}

fn lcs_length(a: &[String], b: &[String]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for item_a in a {
        let mut prev_diag = 0;
        for (j, item_b) in b.iter().enumerate() {
            let prev_row = row[j + 1];
            row[j + 1] = if item_a == item_b {
                prev_diag + 1
            } else {
                row[j + 1].max(row[j])
            };
            prev_diag = prev_row;
        }
    }
    row[b.len()]
}

/// Weighted similarity over structured context attributes, in [0, 1].
///
/// Near-identical contexts cluster near 1.0; contexts differing on every
/// axis separate toward 0.0. Monetary values compare on log magnitude so a
/// $950k and a $1M action read as close while $10k and $1M do not.
pub fn context_similarity(a: &WorkflowContext, b: &WorkflowContext) -> f64 {
    let score = W_DOCUMENT_TYPE * label_eq(&a.document_type, &b.document_type)
        + W_AGENCY * label_eq(&a.agency, &b.agency)
        + W_VALUE * value_similarity(a.value, b.value)
        + W_COMPLEXITY * label_eq(&a.complexity, &b.complexity)
        + W_TIMELINE * label_eq(&a.timeline, &b.timeline)
        + W_METADATA * metadata_overlap(a, b);
    score.clamp(0.0, 1.0)
}

fn label_eq(a: &str, b: &str) -> f64 {
    if a == b {
        1.0
    } else {
        0.0
    }
}

/// Log-magnitude similarity of two monetary values. Three orders of
/// magnitude apart maps to 0.
fn value_similarity(a: f64, b: f64) -> f64 {
    let mag_a = (1.0 + a.max(0.0)).log10();
    let mag_b = (1.0 + b.max(0.0)).log10();
    (1.0 - (mag_a - mag_b).abs() / 3.0).clamp(0.0, 1.0)
}

/// Jaccard index over `key=value` metadata pairs.
fn metadata_overlap(a: &WorkflowContext, b: &WorkflowContext) -> f64 {
    if a.metadata.is_empty() && b.metadata.is_empty() {
        return 1.0;
    }

    let intersection = a
        .metadata
        .iter()
        .filter(|(k, v)| b.metadata.get(*k) == Some(v))
        .count() as f64;
    let union = (a.metadata.len() + b.metadata.len()) as f64 - intersection;

    if union < f64::EPSILON {
        0.0
    } else {
        intersection / union
    }
}
