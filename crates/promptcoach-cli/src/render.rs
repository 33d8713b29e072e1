//! Output rendering for a single evaluation.

use promptcoach_runtime::EvaluationResult;

/// What the one-shot command prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Only the rewritten prompt
    Improved,
    /// Only the unified diff
    Diff,
    /// The full result as pretty JSON
    Json,
}

impl OutputMode {
    /// `--print-improved` wins over `--show-diff`.
    pub fn from_flags(print_improved: bool, show_diff: bool) -> Self {
        if print_improved {
            OutputMode::Improved
        } else if show_diff {
            OutputMode::Diff
        } else {
            OutputMode::Json
        }
    }
}

pub fn render(result: &EvaluationResult, mode: OutputMode) -> serde_json::Result<String> {
    match mode {
        OutputMode::Improved => Ok(result.improved.clone()),
        OutputMode::Diff => Ok(result.diff.clone()),
        OutputMode::Json => serde_json::to_string_pretty(result),
    }
}
