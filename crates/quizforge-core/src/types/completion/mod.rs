//! Completion (fill-in-the-blank) questions.
//!
//! Each blank is graded independently, so a response earns partial credit
//! equal to the fraction of blanks filled correctly.

use serde_json::Value;

use crate::model::{
    Blank, BlankAnswer, CompletionContent, FeedbackBand, GeneratedQuestion, PartialCredit,
    QuestionEvaluationResult, QuestionType,
};
use crate::registry::QuestionTypeRegistry;
use crate::traits::{HandlerBundle, ResponseValidator, Scorer, TypeMetadata};

use super::{content_mismatch, response_tag};

mod format;
pub mod normalize;

pub use format::{blank_marker_spans, count_blank_markers, render_template, NO_ANSWERS_DISPLAY};
pub use normalize::{normalize_response, NormalizedResponse, ResponseShape};

pub const NO_ANSWERS_FEEDBACK: &str = "No answers were provided.";

pub const NO_BLANKS_FEEDBACK: &str = "This question has no blanks to grade.";

/// Validator, scorer, formatter and presentation for `completion`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionHandler;

pub fn metadata() -> TypeMetadata {
    TypeMetadata::new(
        "Fill in the Blank",
        "Complete a sentence by filling in one or more blanks.",
    )
    .with_partial_credit()
}

pub fn register(registry: &mut QuestionTypeRegistry) {
    registry.register(
        QuestionType::Completion,
        HandlerBundle::from_handler(metadata(), CompletionHandler).with_production_ready(true),
    );
}

/// `blank-<id>-correct` or `blank-<id>-incorrect`.
pub fn outcome_tag(blank_id: &str, correct: bool) -> String {
    if correct {
        format!("blank-{blank_id}-correct")
    } else {
        format!("blank-{blank_id}-incorrect")
    }
}

/// Feedback wording for `correct` out of `total` blanks.
pub fn feedback_for(correct: usize, total: usize) -> String {
    if total == 0 {
        return NO_BLANKS_FEEDBACK.to_string();
    }
    match FeedbackBand::from_score(correct as f64 / total as f64) {
        FeedbackBand::Perfect => "Perfect! All blanks are correct.".to_string(),
        FeedbackBand::Good => {
            format!("Good work! You got {correct} out of {total} blanks correct.")
        }
        FeedbackBand::Partial => format!(
            "Partial credit: {correct} out of {total} blanks correct. Review the explanation to see what you missed."
        ),
        FeedbackBand::NeedsPractice => {
            format!("More practice needed: {correct} out of {total} blanks correct.")
        }
    }
}

/// Whether a submitted value matches any accepted answer for the blank.
///
/// Both sides are trimmed; comparison is case-insensitive unless the blank
/// says otherwise. An empty submission never matches.
pub fn is_accepted(blank: &Blank, submitted: &str) -> bool {
    let submitted = submitted.trim();
    if submitted.is_empty() {
        return false;
    }
    if blank.case_sensitive {
        blank
            .accepted_answers
            .iter()
            .any(|accepted| accepted.trim() == submitted)
    } else {
        let submitted = submitted.to_lowercase();
        blank
            .accepted_answers
            .iter()
            .any(|accepted| accepted.trim().to_lowercase() == submitted)
    }
}

/// The value submitted for the blank at `index`.
///
/// Matches by blank id first. When the id is missing the answer at the same
/// position is used instead, unless that answer names a different blank.
///
/// That exception narrows the plain "blank *i* takes response *i*" rule: an
/// answer addressed to another blank is never scored twice, so a response
/// `[b2, b1]` against blanks `[b1, b2]` grades both by id, and `[b2]` alone
/// leaves `b1` unanswered rather than crediting it with `b2`'s value.
pub fn submission_for<'a>(
    content: &CompletionContent,
    index: usize,
    answers: &'a [BlankAnswer],
) -> Option<&'a str> {
    let blank = content.blanks.get(index)?;
    if let Some(answer) = answers.iter().find(|a| a.blank_id == blank.id) {
        return Some(&answer.value);
    }
    let positional = answers.get(index)?;
    if content.blanks.iter().any(|b| b.id == positional.blank_id) {
        return None;
    }
    Some(&positional.value)
}

/// Grade recovered answers against every blank, in blank order.
pub fn grade_blanks(content: &CompletionContent, answers: &[BlankAnswer]) -> Vec<bool> {
    content
        .blanks
        .iter()
        .enumerate()
        .map(|(index, blank)| {
            submission_for(content, index, answers)
                .is_some_and(|submitted| is_accepted(blank, submitted))
        })
        .collect()
}

fn evaluation(
    content: &CompletionContent,
    outcomes: &[bool],
    feedback: String,
) -> QuestionEvaluationResult {
    let total = content.blanks.len();
    let earned = outcomes.iter().filter(|&&ok| ok).count();
    let score = if total == 0 {
        0.0
    } else {
        earned as f64 / total as f64
    };
    let details = content
        .blanks
        .iter()
        .zip(outcomes)
        .map(|(blank, &ok)| outcome_tag(&blank.id, ok))
        .collect();

    QuestionEvaluationResult::new(QuestionType::Completion, score)
        .with_correct_answer(format::correct_answer_text(content))
        .with_feedback(feedback)
        .with_partial_credit(PartialCredit {
            earned: earned as u32,
            possible: total as u32,
            details,
        })
}

impl ResponseValidator for CompletionHandler {
    fn validate(&self, response: &Value) -> bool {
        if !response.is_object() || response_tag(response) != Some(QuestionType::Completion) {
            return false;
        }
        let Some(answers) = response.get("answers").and_then(Value::as_array) else {
            return false;
        };
        answers.iter().all(|answer| {
            answer.get("blankId").is_some_and(Value::is_string)
                && answer.get("value").is_some_and(Value::is_string)
        })
    }
}

impl Scorer for CompletionHandler {
    fn score(&self, question: &GeneratedQuestion, response: &Value) -> QuestionEvaluationResult {
        let Some(content) = question.as_completion() else {
            return content_mismatch(question);
        };

        let answers = match normalize_response(response) {
            Some(normalized) if !normalized.answers.is_empty() => normalized.answers,
            _ => {
                tracing::debug!(
                    question_id = %question.id,
                    "no completion answers found in response"
                );
                return self.unanswered(question);
            }
        };

        let outcomes = grade_blanks(content, &answers);
        let earned = outcomes.iter().filter(|&&ok| ok).count();
        evaluation(content, &outcomes, feedback_for(earned, content.blanks.len()))
    }

    fn unanswered(&self, question: &GeneratedQuestion) -> QuestionEvaluationResult {
        let Some(content) = question.as_completion() else {
            return content_mismatch(question);
        };
        let outcomes = vec![false; content.blanks.len()];
        evaluation(content, &outcomes, NO_ANSWERS_FEEDBACK.to_string())
    }
}
