//! Core types for Prompt Coach evaluation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// The six rubric categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RubricCategory {
    Clarity,
    Context,
    Constraints,
    FormatContract,
    Guardrails,
    Acceptance,
}

impl RubricCategory {
    /// All categories in rubric order.
    pub const ALL: [RubricCategory; 6] = [
        RubricCategory::Clarity,
        RubricCategory::Context,
        RubricCategory::Constraints,
        RubricCategory::FormatContract,
        RubricCategory::Guardrails,
        RubricCategory::Acceptance,
    ];

    /// Wire name of the category.
    pub fn name(&self) -> &'static str {
        match self {
            RubricCategory::Clarity => "clarity",
            RubricCategory::Context => "context",
            RubricCategory::Constraints => "constraints",
            RubricCategory::FormatContract => "format_contract",
            RubricCategory::Guardrails => "guardrails",
            RubricCategory::Acceptance => "acceptance",
        }
    }

    /// Maximum points, awarded when the category's marker is present.
    pub fn cap(&self) -> u32 {
        match self {
            RubricCategory::Clarity => 20,
            RubricCategory::Context => 20,
            RubricCategory::Constraints => 15,
            RubricCategory::FormatContract => 20,
            RubricCategory::Guardrails => 15,
            RubricCategory::Acceptance => 10,
        }
    }

    /// Points awarded when the marker is absent.
    pub fn floor(&self) -> u32 {
        match self {
            RubricCategory::Clarity => 12,
            RubricCategory::Context => 8,
            RubricCategory::Constraints => 7,
            RubricCategory::FormatContract => 8,
            RubricCategory::Guardrails => 6,
            RubricCategory::Acceptance => 4,
        }
    }

    /// Cap if `present`, floor otherwise.
    pub fn award(&self, present: bool) -> u32 {
        if present {
            self.cap()
        } else {
            self.floor()
        }
    }
}

/// Locally computed rubric score.
///
/// Fields are private so a score can only come from [`RubricScore::from_markers`],
/// and `total` always equals the sum of the parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RubricScore {
    clarity: u32,
    context: u32,
    constraints: u32,
    format_contract: u32,
    guardrails: u32,
    acceptance: u32,
    total: u32,
}

impl RubricScore {
    /// Build a score from which category markers were found.
    pub fn from_markers(markers: &RubricMarkers) -> Self {
        let clarity = RubricCategory::Clarity.award(markers.clarity);
        let context = RubricCategory::Context.award(markers.context);
        let constraints = RubricCategory::Constraints.award(markers.constraints);
        let format_contract = RubricCategory::FormatContract.award(markers.format_contract);
        let guardrails = RubricCategory::Guardrails.award(markers.guardrails);
        let acceptance = RubricCategory::Acceptance.award(markers.acceptance);

        Self {
            clarity,
            context,
            constraints,
            format_contract,
            guardrails,
            acceptance,
            total: clarity + context + constraints + format_contract + guardrails + acceptance,
        }
    }

    pub fn clarity(&self) -> u32 {
        self.clarity
    }

    pub fn context(&self) -> u32 {
        self.context
    }

    pub fn constraints(&self) -> u32 {
        self.constraints
    }

    pub fn format_contract(&self) -> u32 {
        self.format_contract
    }

    pub fn guardrails(&self) -> u32 {
        self.guardrails
    }

    pub fn acceptance(&self) -> u32 {
        self.acceptance
    }

    /// Sum of all six sub-scores (0-100).
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Sub-score for a category.
    pub fn get(&self, category: RubricCategory) -> u32 {
        match category {
            RubricCategory::Clarity => self.clarity,
            RubricCategory::Context => self.context,
            RubricCategory::Constraints => self.constraints,
            RubricCategory::FormatContract => self.format_contract,
            RubricCategory::Guardrails => self.guardrails,
            RubricCategory::Acceptance => self.acceptance,
        }
    }
}

/// Which rubric categories had their marker present in a prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricMarkers {
    pub clarity: bool,
    pub context: bool,
    pub constraints: bool,
    pub format_contract: bool,
    pub guardrails: bool,
    pub acceptance: bool,
}

/// Structured judgment returned by the external judge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    /// Judge's rubric breakdown. Opaque; only `total` is read.
    #[serde(default)]
    pub scorecard: Map<String, JsonValue>,

    /// Rewritten prompt in house style
    #[serde(default)]
    pub improved: String,

    /// Commands the user can run to verify assumptions
    #[serde(default)]
    pub verification: Vec<String>,

    #[serde(default)]
    pub notes: Vec<String>,
}

impl Judgment {
    /// Judgment substituted when the judge output cannot be used.
    ///
    /// The original prompt is carried through unchanged so the diff is empty.
    pub fn fallback(original: &str, note: impl Into<String>) -> Self {
        Self {
            scorecard: Map::new(),
            improved: original.to_string(),
            verification: Vec::new(),
            notes: vec![note.into()],
        }
    }

    /// The judge's declared total as given, or 0.0 when absent, not a
    /// number, or not positive.
    pub fn declared_total(&self) -> f64 {
        match self.scorecard.get("total").and_then(JsonValue::as_f64) {
            Some(v) if v.is_finite() && v > 0.0 => v,
            _ => 0.0,
        }
    }

    /// The declared total as an integer, rounded half-to-even.
    pub fn model_total(&self) -> u32 {
        self.declared_total()
            .round_ties_even()
            .min(u32::MAX as f64) as u32
    }
}

/// Token accounting for the judge call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelUsage {
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl ModelUsage {
    pub fn new(model: impl Into<String>, prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            model: model.into(),
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// The merged response for one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Heuristic total
    pub local_score: u32,

    /// Judge's declared total
    pub model_score: u32,

    /// Rounded mean of `local_score` and `model_score`
    pub final_score: u32,

    pub scorecard: Map<String, JsonValue>,
    pub improved: String,

    /// Unified diff from the original prompt to `improved`
    pub diff: String,

    pub verification: Vec<String>,
    pub notes: Vec<String>,
    pub usage: ModelUsage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_caps_sum_to_hundred() {
        let total: u32 = RubricCategory::ALL.iter().map(|c| c.cap()).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_floor_below_cap() {
        for category in RubricCategory::ALL {
            assert!(category.floor() < category.cap(), "{}", category.name());
        }
    }

    #[test]
    fn test_score_from_no_markers() {
        let score = RubricScore::from_markers(&RubricMarkers::default());
        assert_eq!(score.clarity(), 12);
        assert_eq!(score.acceptance(), 4);
        assert_eq!(score.total(), 45);
    }

    #[test]
    fn test_score_serializes_with_total() {
        let markers = RubricMarkers {
            format_contract: true,
            ..Default::default()
        };
        let value = serde_json::to_value(RubricScore::from_markers(&markers)).unwrap();
        assert_eq!(value["format_contract"], 20);
        assert_eq!(value["total"], 57);
    }

    #[test]
    fn test_model_total_variants() {
        let mut judgment = Judgment::default();
        assert_eq!(judgment.model_total(), 0);

        judgment.scorecard.insert("total".into(), json!(72));
        assert_eq!(judgment.model_total(), 72);

        judgment.scorecard.insert("total".into(), json!(71.6));
        assert_eq!(judgment.model_total(), 72);

        judgment.scorecard.insert("total".into(), json!(-5));
        assert_eq!(judgment.model_total(), 0);

        judgment.scorecard.insert("total".into(), json!("88"));
        assert_eq!(judgment.model_total(), 0);

        judgment.scorecard.insert("total".into(), json!(70.5));
        assert_eq!(judgment.model_total(), 70);
        assert_eq!(judgment.declared_total(), 70.5);

        judgment.scorecard.insert("total".into(), json!(71.5));
        assert_eq!(judgment.model_total(), 72);
    }

    #[test]
    fn test_fallback_keeps_original() {
        let judgment = Judgment::fallback("Write a playbook", "non-json model output");
        assert_eq!(judgment.improved, "Write a playbook");
        assert!(judgment.verification.is_empty());
        assert_eq!(judgment.notes.len(), 1);
    }

    #[test]
    fn test_usage_total() {
        let usage = ModelUsage::new("gpt-4o-mini", 120, 80);
        assert_eq!(usage.total_tokens, 200);
    }

    #[test]
    fn test_usage_total_saturates() {
        let usage = ModelUsage::new("gpt-4o-mini", u32::MAX, 1);
        assert_eq!(usage.total_tokens, u32::MAX);
        assert_eq!(usage.prompt_tokens, u32::MAX);
    }
}
