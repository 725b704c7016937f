//! Model-sizing advisory derived from the input-token count.

use serde::Serialize;

use crate::usage::TokenCount;

/// Input-token count above which a smaller model is suggested
pub const SMALL_MODEL_CUTOFF: u64 = 500_000;

/// Advisory outcome for the current session's model choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelAdvice {
    /// Input usage is heavy; a smaller/cheaper model would do
    SwitchSmaller,
    /// Input usage is within range for the current model
    CurrentOk,
    /// The token count could not be normalized; no recommendation
    Unavailable,
}

impl ModelAdvice {
    /// Human-readable advisory line
    pub fn message(&self) -> &'static str {
        match self {
            ModelAdvice::SwitchSmaller => "switch to smaller model",
            ModelAdvice::CurrentOk => "current model acceptable",
            ModelAdvice::Unavailable => "no recommendation",
        }
    }
}

/// Recommend a model size from the recorded input-token count.
///
/// Pure function: expands any magnitude suffix (`500k` → 500000) and compares
/// against [`SMALL_MODEL_CUTOFF`]. A count that cannot be normalized yields
/// [`ModelAdvice::Unavailable`] rather than an error.
pub fn suggest_model(tokens_in: &TokenCount) -> ModelAdvice {
    match tokens_in.normalized() {
        Some(count) if count > SMALL_MODEL_CUTOFF => ModelAdvice::SwitchSmaller,
        Some(_) => ModelAdvice::CurrentOk,
        None => ModelAdvice::Unavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_heavy_input_suggests_smaller_model() {
        assert_eq!(
            suggest_model(&TokenCount::new("600k")),
            ModelAdvice::SwitchSmaller
        );
        assert_eq!(
            suggest_model(&TokenCount::new("500001")),
            ModelAdvice::SwitchSmaller
        );
    }

    #[test]
    fn test_light_input_keeps_current_model() {
        assert_eq!(
            suggest_model(&TokenCount::new("100k")),
            ModelAdvice::CurrentOk
        );
        // Cutoff is strict greater-than
        assert_eq!(
            suggest_model(&TokenCount::new("500k")),
            ModelAdvice::CurrentOk
        );
        assert_eq!(suggest_model(&TokenCount::new("0")), ModelAdvice::CurrentOk);
    }

    #[test]
    fn test_unparseable_count_gives_no_recommendation() {
        assert_eq!(
            suggest_model(&TokenCount::new("abc")),
            ModelAdvice::Unavailable
        );
        assert_eq!(suggest_model(&TokenCount::new("")), ModelAdvice::Unavailable);
    }

    #[test]
    fn test_advice_messages() {
        assert_eq!(ModelAdvice::SwitchSmaller.message(), "switch to smaller model");
        assert_eq!(ModelAdvice::CurrentOk.message(), "current model acceptable");
        assert_eq!(ModelAdvice::Unavailable.message(), "no recommendation");
    }
}
