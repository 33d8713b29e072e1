//! Merge: combines the local score and the judge's judgment into one result.
//!
//! Policy:
//! 1. `final_score` is the mean of the local total and the judge's declared
//!    total, rounded half-to-even once
//! 2. A missing or blank rewrite falls back to the original prompt
//! 3. The diff is always computed from the original to the chosen rewrite
//!
//! The judge's total is not cross-checked against its own sub-scores.
//! Merging never fails.

use crate::diff::unified_diff;
use crate::types::{EvaluationResult, Judgment, ModelUsage, RubricScore};

/// Rounded mean of two totals, ties to even.
pub fn final_score(local_total: u32, model_total: u32) -> u32 {
    blended_score(local_total, model_total as f64)
}

/// Rounded mean of the local total and the judge's exact declared total.
///
/// The declared total is not rounded first, so a fractional total only
/// goes through one rounding step.
pub fn blended_score(local_total: u32, declared_total: f64) -> u32 {
    ((local_total as f64 + declared_total) / 2.0)
        .round_ties_even()
        .min(u32::MAX as f64) as u32
}

/// The Merger turns a local score and a judgment into an [`EvaluationResult`].
pub struct Merger;

impl Merger {
    pub fn new() -> Self {
        Self
    }

    /// Merge into a final result.
    ///
    /// # Arguments
    ///
    /// * `original` - The prompt as submitted
    /// * `local` - Heuristic score of `original`
    /// * `judgment` - The judge's judgment, or a fallback
    /// * `usage` - Token usage of the judge call
    pub fn merge(
        &self,
        original: &str,
        local: &RubricScore,
        judgment: Judgment,
        usage: ModelUsage,
    ) -> EvaluationResult {
        let local_score = local.total();
        let model_score = judgment.model_total();
        let declared_total = judgment.declared_total();

        let improved = if judgment.improved.trim().is_empty() {
            original.to_string()
        } else {
            judgment.improved
        };
        let diff = unified_diff(original, &improved);

        let result = EvaluationResult {
            local_score,
            model_score,
            final_score: blended_score(local_score, declared_total),
            scorecard: judgment.scorecard,
            improved,
            diff,
            verification: judgment.verification,
            notes: judgment.notes,
            usage,
        };

        tracing::debug!(
            local_score = result.local_score,
            model_score = result.model_score,
            final_score = result.final_score,
            "merged evaluation"
        );

        result
    }
}

impl Default for Merger {
    fn default() -> Self {
        Self::new()
    }
}
