//! # promptcoach-runtime
//!
//! LLM-assisted prompt evaluation for Prompt Coach.
//!
//! This crate sends a prompt to an external judge, tolerates unusable
//! replies, and merges the judgment with the local heuristic score from
//! `promptcoach-core`.
//!
//! ## Failure policy
//!
//! - Missing credential: [`CoachError::Config`], before any network call
//! - Non-JSON or malformed judge content: recovered, with a note in the result
//! - `temperature` rejected by the model: one retry without it
//! - Anything else from the judge: [`CoachError::Judge`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use promptcoach_runtime::{score_and_improve, CoachConfig};
//!
//! let config = CoachConfig::from_env()?;
//! let result = score_and_improve("write a postgres playbook", &config).await?;
//! println!("{} -> {}", result.final_score, result.improved);
//! ```

pub mod config;
pub mod judge;
pub mod orchestrator;
pub mod prompts;
pub mod providers;

use thiserror::Error;

pub use config::CoachConfig;
pub use judge::{parse_judgment, Judge, JudgeOutcome, ProviderJudge};
pub use orchestrator::{PromptCoach, PromptCoachBuilder};
pub use prompts::SYSTEM_PROMPT;
pub use providers::{
    ApiCredential, ChatMessage, CompletionConfig, CompletionResponse, CredentialSource,
    LlmProvider, OpenAiProvider, ProviderError, TokenUsage,
};

pub use promptcoach_core::{EvaluationResult, Judgment, ModelUsage, RubricScore};

/// Errors from an evaluation.
#[derive(Error, Debug)]
pub enum CoachError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Heuristic rules error: {0}")]
    Rules(#[from] promptcoach_core::RulesError),

    #[error("Judge call failed: {0}")]
    Judge(#[from] ProviderError),
}

impl CoachError {
    /// True for errors raised before any network call.
    pub fn is_config(&self) -> bool {
        matches!(self, CoachError::Config(_) | CoachError::Rules(_))
    }
}

/// Evaluate one prompt with a judge built from `config`.
///
/// Configuration is checked first; a missing credential fails before any
/// request is made.
pub async fn score_and_improve(
    text: &str,
    config: &CoachConfig,
) -> Result<EvaluationResult, CoachError> {
    let coach = PromptCoach::from_config(config)?;
    coach.evaluate(text).await
}
