//! Judgment orchestrator.
//!
//! Runs one evaluation as a strictly sequential pipeline:
//! 1. Heuristic score (local, never fails)
//! 2. One judge call (plus at most one compatibility retry inside the judge)
//! 3. Deterministic merge into an [`EvaluationResult`]
//!
//! The orchestrator holds no mutable state, so one instance can serve
//! concurrent evaluations.

use std::sync::Arc;

use promptcoach_core::{EvaluationResult, HeuristicRules, HeuristicScorer, Merger};

use crate::config::CoachConfig;
use crate::judge::{Judge, ProviderJudge};
use crate::prompts::SYSTEM_PROMPT;
use crate::providers::OpenAiProvider;
use crate::CoachError;

/// Scores a prompt locally, asks the judge, and merges the two.
pub struct PromptCoach {
    judge: Arc<dyn Judge>,
    scorer: HeuristicScorer,
    system_prompt: String,
    merger: Merger,
}

impl PromptCoach {
    /// Create a coach with the built-in rules and system instruction.
    pub fn new(judge: Arc<dyn Judge>) -> Self {
        Self {
            judge,
            scorer: HeuristicScorer::default(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            merger: Merger::new(),
        }
    }

    /// Build a coach backed by the OpenAI provider.
    ///
    /// Fails with [`CoachError::Config`] if the credential is missing. No
    /// network call happens here.
    pub fn from_config(config: &CoachConfig) -> Result<Self, CoachError> {
        let credential = config.require_api_key()?.clone();

        let provider = OpenAiProvider::new(credential)?.with_base_url(&config.base_url);
        let judge = ProviderJudge::new(Arc::new(provider), config.completion_config());

        let mut builder = PromptCoachBuilder::new().judge(Arc::new(judge));
        if let Some(path) = &config.rules_path {
            builder = builder.rules(HeuristicRules::from_yaml_file(path)?);
        }
        builder.build()
    }

    pub fn scorer(&self) -> &HeuristicScorer {
        &self.scorer
    }

    /// Evaluate one prompt.
    ///
    /// Judge failures are returned as [`CoachError::Judge`] with no partial
    /// result. Unusable judge content still produces a result.
    pub async fn evaluate(&self, text: &str) -> Result<EvaluationResult, CoachError> {
        let local = self.scorer.score(text);

        let outcome = self
            .judge
            .judge(&self.system_prompt, text)
            .await
            .map_err(|e| {
                tracing::warn!(judge = self.judge.name(), error = %e, "judge call failed");
                CoachError::Judge(e)
            })?;

        let result = self
            .merger
            .merge(text, &local, outcome.judgment, outcome.usage);

        tracing::info!(
            judge = self.judge.name(),
            local_score = result.local_score,
            model_score = result.model_score,
            final_score = result.final_score,
            total_tokens = result.usage.total_tokens,
            "prompt evaluated"
        );

        Ok(result)
    }
}

/// Builder for PromptCoach.
pub struct PromptCoachBuilder {
    judge: Option<Arc<dyn Judge>>,
    rules: Option<HeuristicRules>,
    system_prompt: Option<String>,
}

impl PromptCoachBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            judge: None,
            rules: None,
            system_prompt: None,
        }
    }

    /// Set the judge.
    pub fn judge(mut self, judge: Arc<dyn Judge>) -> Self {
        self.judge = Some(judge);
        self
    }

    /// Replace the built-in heuristic rules.
    pub fn rules(mut self, rules: HeuristicRules) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Replace the system instruction.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Build the coach.
    pub fn build(self) -> Result<PromptCoach, CoachError> {
        let judge = self
            .judge
            .ok_or_else(|| CoachError::Config("No judge set".to_string()))?;

        let mut coach = PromptCoach::new(judge);
        if let Some(rules) = self.rules {
            coach.scorer = HeuristicScorer::new(rules)?;
        }
        if let Some(prompt) = self.system_prompt {
            coach.system_prompt = prompt;
        }

        Ok(coach)
    }
}

impl Default for PromptCoachBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::{JudgeOutcome, NON_JSON_NOTE};
    use crate::providers::ProviderError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use promptcoach_core::{final_score, score_prompt, Judgment, ModelUsage};
    use serde_json::json;

    enum Reply {
        Judgment(Judgment),
        Fallback,
        Fail,
    }

    /// Judge that records each call and answers from a fixed reply.
    struct MockJudge {
        reply: Reply,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl MockJudge {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl Judge for MockJudge {
        async fn judge(
            &self,
            system_instruction: &str,
            prompt: &str,
        ) -> Result<JudgeOutcome, ProviderError> {
            self.calls
                .lock()
                .push((system_instruction.to_string(), prompt.to_string()));

            match &self.reply {
                Reply::Judgment(j) => Ok(JudgeOutcome {
                    judgment: j.clone(),
                    usage: ModelUsage::new("mock-model", 10, 5),
                }),
                Reply::Fallback => Ok(JudgeOutcome {
                    judgment: Judgment::fallback(prompt, NON_JSON_NOTE),
                    usage: ModelUsage::default(),
                }),
                Reply::Fail => Err(ProviderError::HttpError("connection refused".into())),
            }
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    fn rewrite(total: u32, improved: &str) -> Judgment {
        let mut scorecard = serde_json::Map::new();
        scorecard.insert("total".into(), json!(total));
        Judgment {
            scorecard,
            improved: improved.to_string(),
            verification: vec!["ansible --version".to_string()],
            notes: vec!["Added guardrails".to_string()],
        }
    }

    #[tokio::test]
    async fn test_evaluate_merges_judgment() {
        let judge = MockJudge::new(Reply::Judgment(rewrite(
            90,
            "[ROLE SETUP]\nAct as an Ansible reviewer.\n[TASK]\nWrite a playbook.",
        )));
        let coach = PromptCoach::new(judge.clone());

        let prompt = "write a playbook";
        let result = coach.evaluate(prompt).await.unwrap();

        let local = score_prompt(prompt).total();
        assert_eq!(result.local_score, local);
        assert_eq!(result.model_score, 90);
        assert_eq!(result.final_score, final_score(local, 90));
        assert!(result.diff.contains("-write a playbook"));
        assert!(result.diff.contains("+[ROLE SETUP]"));
        assert_eq!(result.usage.total_tokens, 15);
        assert_eq!(judge.call_count(), 1);
    }

    #[tokio::test]
    async fn test_evaluate_sends_system_prompt_and_raw_text() {
        let judge = MockJudge::new(Reply::Fallback);
        let coach = PromptCoach::new(judge.clone());

        coach.evaluate("  raw prompt\n").await.unwrap();

        let calls = judge.calls.lock();
        assert_eq!(calls[0].0, SYSTEM_PROMPT);
        assert_eq!(calls[0].1, "  raw prompt\n");
    }

    #[tokio::test]
    async fn test_fallback_judgment_keeps_original() {
        let judge = MockJudge::new(Reply::Fallback);
        let coach = PromptCoach::new(judge);

        let prompt = "Task: Write a Python CLI with type hints and tests.";
        let result = coach.evaluate(prompt).await.unwrap();

        assert_eq!(result.improved, prompt);
        assert_eq!(result.diff, "");
        assert!(result.verification.is_empty());
        assert!(!result.notes.is_empty());
        assert_eq!(result.model_score, 0);
        assert_eq!(result.usage, ModelUsage::default());
    }

    #[tokio::test]
    async fn test_judge_failure_propagates() {
        let coach = PromptCoach::new(MockJudge::new(Reply::Fail));
        let err = coach.evaluate("anything").await.unwrap_err();
        assert!(matches!(err, CoachError::Judge(ProviderError::HttpError(_))));
    }

    #[tokio::test]
    async fn test_builder_custom_rules_and_prompt() {
        let judge = MockJudge::new(Reply::Fallback);
        let coach = PromptCoachBuilder::new()
            .judge(judge.clone())
            .rules(HeuristicRules {
                context_keywords: vec!["Terraform".to_string()],
                ..Default::default()
            })
            .system_prompt("custom instruction")
            .build()
            .unwrap();

        let result = coach.evaluate("plan Terraform changes").await.unwrap();
        let expected = coach.scorer().score("plan Terraform changes").total();
        assert_eq!(result.local_score, expected);
        assert_eq!(coach.scorer().score("plan Terraform changes").context(), 20);
        assert_eq!(judge.calls.lock()[0].0, "custom instruction");
    }

    #[test]
    fn test_builder_requires_judge() {
        let result = PromptCoachBuilder::new().build();
        assert!(matches!(result, Err(CoachError::Config(_))));
    }

    #[test]
    fn test_from_config_without_key_fails() {
        let result = PromptCoach::from_config(&CoachConfig::default());
        assert!(matches!(result, Err(CoachError::Config(_))));
    }

    #[tokio::test]
    async fn test_concurrent_evaluations_are_independent() {
        let judge = MockJudge::new(Reply::Fallback);
        let coach = Arc::new(PromptCoach::new(judge.clone()));

        let prompts: Vec<String> = (0..8).map(|i| format!("prompt number {}", i)).collect();
        let results = futures::future::join_all(prompts.iter().map(|p| {
            let coach = coach.clone();
            async move { coach.evaluate(p).await }
        }))
        .await;

        for (prompt, result) in prompts.iter().zip(results) {
            assert_eq!(&result.unwrap().improved, prompt);
        }
        assert_eq!(judge.call_count(), 8);
    }
}
