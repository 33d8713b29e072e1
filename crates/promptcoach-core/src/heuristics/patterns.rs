//! Built-in marker patterns for the heuristic scorer.
//!
//! These are the English defaults. [`HeuristicRules`](super::HeuristicRules)
//! starts from them and may override any set from YAML.

use lazy_static::lazy_static;

use super::{HeuristicRules, HeuristicScorer};

// =========================================================================
// SUBSTRING MARKERS (case-sensitive)
// =========================================================================

/// Markers that introduce an explicit task.
pub const TASK_MARKERS: &[&str] = &["Task:", "Write", "Create"];

/// Platform names, version markers, and the literal word "constraints".
pub const CONTEXT_KEYWORDS: &[&str] = &[
    "RHEL",
    "PostgreSQL",
    "Python",
    "Ansible",
    "versions",
    "constraints",
];

/// Engineering constraints a reviewer looks for.
pub const CONSTRAINT_KEYWORDS: &[&str] = &[
    "idempotent",
    "no shell",
    "lint",
    "type hints",
    "RLS",
    "security",
];

/// Minimum whitespace-separated tokens for a prompt to count as clear.
pub const MIN_CLARITY_TOKENS: usize = 6;

// =========================================================================
// REGEX MARKERS (matched case-insensitively)
// =========================================================================

/// Explicit role setup ("Act as ...").
pub const ROLE_PATTERN: &str = r"\bAct as\b|\bRole\b";

/// Explicit output-format directive.
pub const FORMAT_PATTERN: &str = r"\bRespond only with\b|\bOutput\b.*(JSON|YAML|table|code only)";

/// Anti-fabrication or verification language.
pub const GUARDRAILS_PATTERN: &str =
    r"\bDo not fabricate\b|\bverification\b|\bcommands to verify\b";

/// Acceptance-criteria or test language.
pub const ACCEPTANCE_PATTERN: &str =
    r"\bAcceptance\b|\bAcceptance Criteria\b|\btests\b|\bvalidation\b";

lazy_static! {
    /// Scorer compiled from the built-in rules.
    pub static ref DEFAULT_SCORER: HeuristicScorer =
        HeuristicScorer::new(HeuristicRules::default()).unwrap();
}
