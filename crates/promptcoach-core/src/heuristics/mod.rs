//! Heuristic Scorer.
//!
//! Assigns a rubric score to a prompt using local text checks only.
//!
//! | Category | Marker | Cap | Floor |
//! |----------|--------|-----|-------|
//! | clarity | ≥ N tokens and a task marker | 20 | 12 |
//! | context | any context keyword | 20 | 8 |
//! | constraints | any constraint keyword | 15 | 7 |
//! | format_contract | format pattern | 20 | 8 |
//! | guardrails | guardrails pattern | 15 | 6 |
//! | acceptance | acceptance pattern | 10 | 4 |
//!
//! Checks are independent. Keyword checks are case-sensitive substring
//! tests; pattern checks are case-insensitive regexes.

pub mod patterns;
mod rules;

pub use rules::{HeuristicRules, RulesError};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::types::{RubricMarkers, RubricScore};

/// Markers found in a prompt, for explaining a score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signals {
    pub role: bool,
    pub task: bool,
    pub enough_tokens: bool,
    pub context: bool,
    pub constraints: bool,
    pub format: bool,
    pub guardrails: bool,
    pub acceptance: bool,
}

impl Signals {
    /// Map signals onto rubric categories.
    pub fn markers(&self) -> RubricMarkers {
        RubricMarkers {
            clarity: self.enough_tokens && self.task,
            context: self.context,
            constraints: self.constraints,
            format_contract: self.format,
            guardrails: self.guardrails,
            acceptance: self.acceptance,
        }
    }
}

/// Compiled heuristic scorer.
#[derive(Debug, Clone)]
pub struct HeuristicScorer {
    rules: HeuristicRules,
    role: Regex,
    format: Regex,
    guardrails: Regex,
    acceptance: Regex,
}

impl HeuristicScorer {
    /// Compile a scorer from rules.
    pub fn new(rules: HeuristicRules) -> Result<Self, RulesError> {
        let role = compile("role_pattern", &rules.role_pattern)?;
        let format = compile("format_pattern", &rules.format_pattern)?;
        let guardrails = compile("guardrails_pattern", &rules.guardrails_pattern)?;
        let acceptance = compile("acceptance_pattern", &rules.acceptance_pattern)?;

        Ok(Self {
            rules,
            role,
            format,
            guardrails,
            acceptance,
        })
    }

    /// Detect which markers are present in `text`.
    pub fn signals(&self, text: &str) -> Signals {
        let t = text.trim();

        Signals {
            role: self.role.is_match(t),
            task: contains_any(t, &self.rules.task_markers),
            enough_tokens: t.split_whitespace().count() >= self.rules.min_clarity_tokens,
            context: contains_any(t, &self.rules.context_keywords),
            constraints: contains_any(t, &self.rules.constraint_keywords),
            format: self.format.is_match(t),
            guardrails: self.guardrails.is_match(t),
            acceptance: self.acceptance.is_match(t),
        }
    }

    /// Score `text` against the rubric. Never fails.
    pub fn score(&self, text: &str) -> RubricScore {
        let signals = self.signals(text);
        let score = RubricScore::from_markers(&signals.markers());

        tracing::debug!(
            clarity = score.clarity(),
            context = score.context(),
            constraints = score.constraints(),
            format_contract = score.format_contract(),
            guardrails = score.guardrails(),
            acceptance = score.acceptance(),
            total = score.total(),
            role = signals.role,
            "heuristic score"
        );

        score
    }
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        patterns::DEFAULT_SCORER.clone()
    }
}

fn compile(field: &'static str, pattern: &str) -> Result<Regex, RulesError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| RulesError::InvalidPattern { field, source })
}

fn contains_any(text: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| !n.is_empty() && text.contains(n.as_str()))
}

/// Score a prompt with the built-in rules.
pub fn score_prompt(text: &str) -> RubricScore {
    patterns::DEFAULT_SCORER.score(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RubricCategory;
    use proptest::prelude::*;

    const REVIEWER_PROMPT: &str = "Act as a senior Ansible reviewer.
    Context: RHEL9, Postgres 16.
    Task: Write idempotent playbook.
    Respond only with YAML.
    Do not fabricate; if unsure, suggest commands to verify.
    Acceptance: passes ansible-lint.";

    #[test]
    fn test_detects_format_and_guardrails() {
        let score = score_prompt(REVIEWER_PROMPT);
        assert!(score.format_contract() >= 15);
        assert!(score.guardrails() >= 10);
        assert!(score.total() > 60);
    }

    #[test]
    fn test_reviewer_prompt_hits_every_cap() {
        let score = score_prompt(REVIEWER_PROMPT);
        assert_eq!(score.total(), 100);

        let signals = HeuristicScorer::default().signals(REVIEWER_PROMPT);
        assert!(signals.role);
        assert!(signals.task);
    }

    #[test]
    fn test_empty_prompt_scores_floors() {
        let score = score_prompt("");
        for category in RubricCategory::ALL {
            assert_eq!(score.get(category), category.floor(), "{}", category.name());
        }
        assert_eq!(score.total(), 45);
    }

    #[test]
    fn test_clarity_needs_tokens_and_marker() {
        // Marker, too few tokens
        assert_eq!(score_prompt("Write a playbook").clarity(), 12);
        // Enough tokens, no marker
        assert_eq!(
            score_prompt("please make me a nice playbook for servers").clarity(),
            12
        );
        assert_eq!(
            score_prompt("Create a playbook that installs nginx everywhere").clarity(),
            20
        );
    }

    #[test]
    fn test_keyword_checks_are_case_sensitive() {
        assert_eq!(score_prompt("use ansible").context(), 8);
        assert_eq!(score_prompt("use Ansible").context(), 20);
        assert_eq!(score_prompt("keep it IDEMPOTENT").constraints(), 7);
        assert_eq!(score_prompt("keep it idempotent").constraints(), 15);
    }

    #[test]
    fn test_pattern_checks_are_case_insensitive() {
        let score = score_prompt("respond ONLY with json. DO NOT FABRICATE. add TESTS.");
        assert_eq!(score.format_contract(), 20);
        assert_eq!(score.guardrails(), 15);
        assert_eq!(score.acceptance(), 10);
    }

    #[test]
    fn test_custom_rules() {
        let rules = HeuristicRules {
            context_keywords: vec!["Kubernetes".to_string()],
            ..Default::default()
        };
        let scorer = HeuristicScorer::new(rules).unwrap();

        assert_eq!(scorer.score("deploy to Kubernetes").context(), 20);
        assert_eq!(scorer.score("deploy with Ansible").context(), 8);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let rules = HeuristicRules {
            guardrails_pattern: "(unclosed".to_string(),
            ..Default::default()
        };
        match HeuristicScorer::new(rules) {
            Err(RulesError::InvalidPattern { field, .. }) => {
                assert_eq!(field, "guardrails_pattern")
            }
            other => panic!("Expected InvalidPattern, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_empty_keyword_never_matches() {
        let rules = HeuristicRules {
            constraint_keywords: vec![String::new()],
            ..Default::default()
        };
        let scorer = HeuristicScorer::new(rules).unwrap();
        assert_eq!(scorer.score("anything").constraints(), 7);
    }

    proptest! {
        #[test]
        fn prop_sub_scores_within_caps(text in ".{0,400}") {
            let score = score_prompt(&text);
            let mut sum = 0;
            for category in RubricCategory::ALL {
                let value = score.get(category);
                prop_assert!(value <= category.cap());
                prop_assert!(value == category.cap() || value == category.floor());
                sum += value;
            }
            prop_assert_eq!(score.total(), sum);
            prop_assert!(score.total() <= 100);
        }

        #[test]
        fn prop_scoring_is_deterministic(text in "\\PC{0,200}") {
            prop_assert_eq!(score_prompt(&text), score_prompt(&text));
        }
    }
}
