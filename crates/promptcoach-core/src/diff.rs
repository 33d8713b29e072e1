//! Line-oriented unified diff between the original and improved prompt.

use similar::TextDiff;

/// Header label for the original prompt.
pub const ORIGINAL_LABEL: &str = "original";

/// Header label for the improved prompt.
pub const IMPROVED_LABEL: &str = "improved";

/// Unified diff from `original` to `improved` with 3 lines of context.
///
/// Returns an empty string when the texts are identical.
pub fn unified_diff(original: &str, improved: &str) -> String {
    if original == improved {
        return String::new();
    }

    TextDiff::from_lines(original, improved)
        .unified_diff()
        .context_radius(3)
        .header(ORIGINAL_LABEL, IMPROVED_LABEL)
        .to_string()
}
