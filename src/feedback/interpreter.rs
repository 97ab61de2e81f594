//! Feedback-to-reward interpretation.
//!
//! Two interchangeable variants implement the same capability: a
//! deterministic lexical classifier and an LLM-backed classifier that
//! degrades to the lexical one when the model's answer is unusable. The
//! variant is chosen by configuration, never by string matching at call
//! sites.

use std::sync::Arc;

use tracing::warn;

use crate::error::Result;

/// Parses free-text feedback into a reward in [0,1].
pub trait FeedbackInterpreter: Send + Sync {
    fn parse(&self, text: &str) -> f64;
}

/// Convert a 1-5 grade into a reward.
///
/// # Reward scale
/// - 5: 1.0 (strong hire)
/// - 3: 0.5 (neutral)
/// - 1: 0.0 (strong no-hire)
#[must_use]
pub fn reward_from_grade(grade: u8) -> f64 {
    (f64::from(grade.clamp(1, 5)) - 1.0) / 4.0
}

/// Phrase weights for the lexical classifier, strongest match first.
/// Multi-word phrases outrank their substrings ("no hire" before "hire").
const PHRASES: [(&str, f64); 14] = [
    ("strong hire", 1.0),
    ("no hire", 0.0),
    ("strong no", 0.0),
    ("definitely not", 0.0),
    ("not a fit", 0.1),
    ("reject", 0.0),
    ("exceptional", 1.0),
    ("excellent", 0.9),
    ("impressive", 0.85),
    ("hire", 0.8),
    ("promising", 0.7),
    ("mediocre", 0.3),
    ("weak", 0.2),
    ("poor", 0.1),
];

/// Deterministic keyword/valence classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalInterpreter;

impl LexicalInterpreter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FeedbackInterpreter for LexicalInterpreter {
    fn parse(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let mut matched = Vec::new();
        let mut consumed = lowered.clone();

        for (phrase, weight) in PHRASES {
            if consumed.contains(phrase) {
                matched.push(weight);
                // Remove the match so "no hire" does not also count as "hire".
                consumed = consumed.replace(phrase, " ");
            }
        }

        if matched.is_empty() {
            // No signal either way: neutral prior.
            return 0.5;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = matched.iter().sum::<f64>() / matched.len() as f64;
        mean.clamp(0.0, 1.0)
    }
}

/// Injected completion contract; the engine never speaks HTTP itself.
pub trait LlmClient: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// LLM-backed classifier. Asks the model for a bare number in [0,1] and
/// falls back to the lexical classifier when the call fails or the answer
/// does not parse.
pub struct LlmInterpreter {
    client: Arc<dyn LlmClient>,
    fallback: LexicalInterpreter,
}

impl LlmInterpreter {
    #[must_use]
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            fallback: LexicalInterpreter::new(),
        }
    }

    fn prompt(text: &str) -> String {
        format!(
            "Rate the following recruiter feedback about a candidate as a \
             single number between 0.0 (certain reject) and 1.0 (certain \
             hire). Reply with only the number.\n\nFeedback: {text}"
        )
    }
}

impl FeedbackInterpreter for LlmInterpreter {
    fn parse(&self, text: &str) -> f64 {
        match self.client.complete(&Self::prompt(text)) {
            Ok(answer) => match answer.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => value.clamp(0.0, 1.0),
                _ => {
                    warn!(answer = %answer.trim(), "unparseable reward, using lexical fallback");
                    self.fallback.parse(text)
                }
            },
            Err(err) => {
                warn!(%err, "llm client failed, using lexical fallback");
                self.fallback.parse(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoutError;

    #[test]
    fn grades_span_the_reward_range() {
        assert!(reward_from_grade(1).abs() < f64::EPSILON);
        assert!((reward_from_grade(3) - 0.5).abs() < f64::EPSILON);
        assert!((reward_from_grade(5) - 1.0).abs() < f64::EPSILON);
        // Out-of-range grades clamp instead of extrapolating.
        assert!((reward_from_grade(9) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn lexical_positive_and_negative_phrases() {
        let interpreter = LexicalInterpreter::new();
        assert!(interpreter.parse("Strong hire, exceptional system design") > 0.9);
        assert!(interpreter.parse("no hire, weak fundamentals") < 0.2);
    }

    #[test]
    fn no_hire_does_not_count_as_hire() {
        let interpreter = LexicalInterpreter::new();
        assert!(interpreter.parse("no hire") < 0.1);
    }

    #[test]
    fn unmatched_text_is_neutral() {
        let interpreter = LexicalInterpreter::new();
        assert!((interpreter.parse("spoke on tuesday about logistics") - 0.5).abs() < f64::EPSILON);
    }

    struct FixedClient(&'static str);
    impl LlmClient for FixedClient {
        fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingClient;
    impl LlmClient for FailingClient {
        fn complete(&self, _prompt: &str) -> Result<String> {
            Err(ScoutError::Config("offline".to_string()))
        }
    }

    #[test]
    fn llm_interpreter_uses_the_model_answer() {
        let interpreter = LlmInterpreter::new(Arc::new(FixedClient("0.85")));
        assert!((interpreter.parse("whatever") - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn llm_interpreter_clamps_out_of_range_answers() {
        let interpreter = LlmInterpreter::new(Arc::new(FixedClient("7.5")));
        assert!((interpreter.parse("whatever") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn llm_interpreter_falls_back_on_garbage() {
        let interpreter = LlmInterpreter::new(Arc::new(FixedClient("as an ai model")));
        assert!((interpreter.parse("strong hire") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn llm_interpreter_falls_back_on_error() {
        let interpreter = LlmInterpreter::new(Arc::new(FailingClient));
        assert!(interpreter.parse("reject") < 0.1);
    }
}
