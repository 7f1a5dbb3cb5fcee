//! Built-in question types.
//!
//! Each submodule owns one tag and exposes a `register` function that installs
//! its handler bundle. Adding a question type means adding a module here and a
//! call in [`register_builtin_types`]; nothing else changes.

use serde_json::Value;

use crate::model::{GeneratedQuestion, QuestionEvaluationResult, QuestionType};
use crate::registry::QuestionTypeRegistry;

pub mod completion;
pub mod multiple_choice;

/// Register every built-in question type.
pub fn register_builtin_types(registry: &mut QuestionTypeRegistry) {
    multiple_choice::register(registry);
    completion::register(registry);
}

/// The tag a raw response declares, via `type` or `questionType`.
pub(crate) fn response_tag(response: &Value) -> Option<QuestionType> {
    response
        .get("type")
        .or_else(|| response.get("questionType"))
        .and_then(Value::as_str)
        .and_then(|tag| tag.parse().ok())
}

/// Zero-credit result for a question whose payload does not match its tag.
pub(crate) fn content_mismatch(question: &GeneratedQuestion) -> QuestionEvaluationResult {
    tracing::warn!(
        question_id = %question.id,
        question_type = %question.question_type,
        "question content does not match its type"
    );
    QuestionEvaluationResult::new(question.question_type, 0.0)
        .with_feedback("This question could not be graded.")
}
