//! Shared formatting helpers and the fallback formatter.
//!
//! The fallback is used whenever a question's tag has no registered bundle,
//! so formatting never fails the caller.

use serde_json::Value;

use crate::model::{GeneratedQuestion, QuestionEvaluationResult, StructuredAnswer};

/// Separator between numbered segments of a multi-part answer.
pub const BULLET: &str = " • ";

pub const NO_EXPLANATION: &str = "No explanation available.";

pub const UNKNOWN_ANSWER: &str = "Unknown";

/// Wrap a value in double quotes for display.
pub fn quoted(value: &str) -> String {
    format!("\"{value}\"")
}

/// The question's explanation, else the evaluation feedback, else a placeholder.
pub fn explanation_text(
    question: &GeneratedQuestion,
    evaluation: &QuestionEvaluationResult,
) -> String {
    let explanation = question.explanation.trim();
    if !explanation.is_empty() {
        return explanation.to_string();
    }
    evaluation
        .feedback
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or(NO_EXPLANATION)
        .to_string()
}

/// Formatter for questions whose type has no registered bundle.
///
/// It knows nothing about the payload, so it serializes the raw response and
/// surfaces whatever the evaluation itself carries.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackFormatter;

impl FallbackFormatter {
    /// The raw response as compact JSON, so string payloads stay quoted.
    pub fn format_user_answer(&self, response: &Value) -> String {
        if response.is_null() {
            return "No answer provided".to_string();
        }
        serde_json::to_string(response).unwrap_or_else(|_| UNKNOWN_ANSWER.to_string())
    }

    pub fn format_correct_answer(&self, evaluation: &QuestionEvaluationResult) -> String {
        evaluation
            .correct_answer
            .clone()
            .unwrap_or_else(|| UNKNOWN_ANSWER.to_string())
    }

    pub fn format_explanation(
        &self,
        question: &GeneratedQuestion,
        evaluation: &QuestionEvaluationResult,
    ) -> String {
        explanation_text(question, evaluation)
    }

    pub fn structured_answer(
        &self,
        question: &GeneratedQuestion,
        response: &Value,
        evaluation: &QuestionEvaluationResult,
    ) -> StructuredAnswer {
        StructuredAnswer::new(
            question.question_type,
            response.clone(),
            self.format_user_answer(response),
        )
        .with_meta("fallback", true)
        .with_meta("score", evaluation.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionType;
    use serde_json::json;

    fn matching_question() -> GeneratedQuestion {
        serde_json::from_value(json!({
            "id": "m1",
            "type": "matching",
            "question": "Match the capitals",
            "content": {}
        }))
        .unwrap()
    }

    #[test]
    fn fallback_serializes_raw_response() {
        let formatter = FallbackFormatter;
        let raw = json!({ "type": "matching", "pairs": [["France", "Paris"]] });
        let text = formatter.format_user_answer(&raw);
        assert!(text.contains("Paris"));
        assert_eq!(formatter.format_user_answer(&Value::Null), "No answer provided");
        assert_eq!(formatter.format_user_answer(&json!("France=Paris")), r#""France=Paris""#);
        assert_eq!(formatter.format_user_answer(&json!(3)), "3");
    }

    #[test]
    fn fallback_surfaces_evaluation_fields() {
        let formatter = FallbackFormatter;
        let question = matching_question();
        let evaluation = QuestionEvaluationResult::new(QuestionType::Matching, 0.0)
            .with_feedback("Unsupported question type: matching");

        assert_eq!(formatter.format_correct_answer(&evaluation), UNKNOWN_ANSWER);
        assert_eq!(
            formatter.format_explanation(&question, &evaluation),
            "Unsupported question type: matching"
        );

        let structured = formatter.structured_answer(&question, &json!([1, 2]), &evaluation);
        assert_eq!(structured.display_text, "[1,2]");
        assert_eq!(structured.metadata["fallback"], json!(true));
    }

    #[test]
    fn explanation_prefers_question_text() {
        let question = matching_question().with_explanation("  Paris is the capital.  ");
        let evaluation = QuestionEvaluationResult::new(QuestionType::Matching, 1.0);
        assert_eq!(explanation_text(&question, &evaluation), "Paris is the capital.");

        let bare = matching_question();
        assert_eq!(explanation_text(&bare, &evaluation), NO_EXPLANATION);
    }
}
