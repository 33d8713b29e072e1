//! Heuristic rule sets as configuration data.
//!
//! A rules file may set any subset of fields; the rest keep the built-in
//! English defaults.
//!
//! ```yaml
//! context_keywords: ["Kubernetes", "Terraform", "versions"]
//! format_pattern: '\bformat:\s*(json|yaml)\b'
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::patterns;

/// Errors that can occur when loading heuristic rules.
#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Failed to read rules file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid pattern for {field}: {source}")]
    InvalidPattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// Marker sets and patterns used by the heuristic scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicRules {
    /// Substrings that introduce an explicit task (clarity)
    pub task_markers: Vec<String>,

    /// Minimum whitespace-separated tokens for clarity
    pub min_clarity_tokens: usize,

    /// Domain/context keywords (context)
    pub context_keywords: Vec<String>,

    /// Engineering-constraint keywords (constraints)
    pub constraint_keywords: Vec<String>,

    /// Case-insensitive role pattern (signal only, not scored)
    pub role_pattern: String,

    /// Case-insensitive output-format directive (format_contract)
    pub format_pattern: String,

    /// Case-insensitive anti-fabrication pattern (guardrails)
    pub guardrails_pattern: String,

    /// Case-insensitive acceptance pattern (acceptance)
    pub acceptance_pattern: String,
}

impl Default for HeuristicRules {
    fn default() -> Self {
        Self {
            task_markers: to_owned(patterns::TASK_MARKERS),
            min_clarity_tokens: patterns::MIN_CLARITY_TOKENS,
            context_keywords: to_owned(patterns::CONTEXT_KEYWORDS),
            constraint_keywords: to_owned(patterns::CONSTRAINT_KEYWORDS),
            role_pattern: patterns::ROLE_PATTERN.to_string(),
            format_pattern: patterns::FORMAT_PATTERN.to_string(),
            guardrails_pattern: patterns::GUARDRAILS_PATTERN.to_string(),
            acceptance_pattern: patterns::ACCEPTANCE_PATTERN.to_string(),
        }
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl HeuristicRules {
    /// Parse rules from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, RulesError> {
        // An empty document deserializes to unit, not to a map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load rules from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}
