//! # promptcoach-core
//!
//! Deterministic prompt scoring for Prompt Coach.
//!
//! This crate provides the local half of an evaluation:
//! - The heuristic rubric scorer
//! - The judgment and result types shared with the runtime
//! - The merge policy and the original-to-improved diff
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same prompt always produces the same score
//! 2. **No network**: All scoring is pattern-based
//! 3. **Infallible**: Scoring and merging never return errors
//!
//! ## Example
//!
//! ```rust
//! use promptcoach_core::score_prompt;
//!
//! let score = score_prompt("Task: Write an idempotent playbook. Respond only with YAML.");
//! assert_eq!(score.format_contract(), 20);
//! assert!(score.total() <= 100);
//! ```

pub mod diff;
pub mod heuristics;
pub mod merge;
pub mod types;

// Re-export main types at crate root
pub use diff::unified_diff;
pub use heuristics::{score_prompt, HeuristicRules, HeuristicScorer, RulesError, Signals};
pub use merge::{blended_score, final_score, Merger};
pub use types::{
    EvaluationResult, Judgment, ModelUsage, RubricCategory, RubricMarkers, RubricScore,
};
