//! Display formatting and plain-text rendering for completion questions.

use serde_json::Value;

use crate::format::{quoted, BULLET};
use crate::model::{
    Blank, BlankAnswer, CompletionContent, GeneratedQuestion, QuestionEvaluationResult,
    QuestionResponse, QuestionType, StructuredAnswer,
};
use crate::traits::{PresentationHandler, ResultFormatter};

use super::normalize::normalize_response;
use super::{submission_for, CompletionHandler};

/// Shortest run of underscores treated as a blank marker.
const MIN_MARKER_LEN: usize = 3;

pub const NO_ANSWERS_DISPLAY: &str = "No answers provided";

/// Byte ranges of the blank markers in a template.
pub fn blank_marker_spans(template: &str) -> Vec<(usize, usize)> {
    let bytes = template.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'_' {
            let start = i;
            while i < bytes.len() && bytes[i] == b'_' {
                i += 1;
            }
            if i - start >= MIN_MARKER_LEN {
                spans.push((start, i));
            }
        } else {
            i += 1;
        }
    }
    spans
}

pub fn count_blank_markers(template: &str) -> usize {
    blank_marker_spans(template).len()
}

/// Replace the n-th blank marker with `label(n)`.
pub fn render_template(template: &str, label: impl Fn(usize) -> String) -> String {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for (index, (start, end)) in blank_marker_spans(template).into_iter().enumerate() {
        out.push_str(&template[last..start]);
        out.push_str(&label(index));
        last = end;
    }
    out.push_str(&template[last..]);
    out
}

/// `"sunny"` or `"sunny" (+2 more)`.
fn accepted_display(blank: &Blank) -> String {
    let primary = quoted(blank.primary_answer());
    match blank.alternate_count() {
        0 => primary,
        n => format!("{primary} (+{n} more)"),
    }
}

/// Single blanks print bare; several blanks print numbered and bullet-separated.
fn numbered<T: AsRef<str>>(segments: &[T]) -> String {
    if segments.len() == 1 {
        return segments[0].as_ref().to_string();
    }
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| format!("{}:{}", i + 1, segment.as_ref()))
        .collect::<Vec<_>>()
        .join(BULLET)
}

pub(crate) fn correct_answer_text(content: &CompletionContent) -> String {
    if content.blanks.is_empty() {
        return "No blanks".to_string();
    }
    let segments: Vec<String> = content.blanks.iter().map(accepted_display).collect();
    numbered(&segments)
}

/// Submitted values in blank order, or in submission order when the
/// question carries no completion payload.
fn submitted_values(question: &GeneratedQuestion, answers: &[BlankAnswer]) -> Vec<String> {
    match question.as_completion() {
        Some(content) => (0..content.blanks.len())
            .map(|index| {
                submission_for(content, index, answers)
                    .map(|value| value.trim().to_string())
                    .unwrap_or_default()
            })
            .collect(),
        None => answers.iter().map(|a| a.value.trim().to_string()).collect(),
    }
}

impl ResultFormatter for CompletionHandler {
    fn format_user_answer(&self, question: &GeneratedQuestion, response: &Value) -> String {
        let answers = match normalize_response(response) {
            Some(normalized) if !normalized.answers.is_empty() => normalized.answers,
            _ => return NO_ANSWERS_DISPLAY.to_string(),
        };
        let values = submitted_values(question, &answers);
        if values.iter().all(String::is_empty) {
            return NO_ANSWERS_DISPLAY.to_string();
        }
        let segments: Vec<String> = values.iter().map(|v| quoted(v)).collect();
        numbered(&segments)
    }

    fn format_correct_answer(&self, question: &GeneratedQuestion) -> String {
        question
            .as_completion()
            .map(correct_answer_text)
            .unwrap_or_else(|| crate::format::UNKNOWN_ANSWER.to_string())
    }

    fn structured_user_answer(
        &self,
        question: &GeneratedQuestion,
        response: &Value,
        evaluation: &QuestionEvaluationResult,
    ) -> Option<StructuredAnswer> {
        let content = question.as_completion()?;
        let normalized = normalize_response(response);
        let answered = normalized
            .as_ref()
            .map(|n| {
                submitted_values(question, &n.answers)
                    .iter()
                    .filter(|v| !v.is_empty())
                    .count()
            })
            .unwrap_or(0);
        let shape = normalized
            .as_ref()
            .map(|n| Value::from(n.shape.as_str()))
            .unwrap_or(Value::Null);
        let correct = evaluation
            .partial_credit
            .as_ref()
            .map(|credit| credit.earned)
            .unwrap_or(0);

        Some(
            StructuredAnswer::new(
                QuestionType::Completion,
                response.clone(),
                self.format_user_answer(question, response),
            )
            .with_meta("blankCount", content.blanks.len())
            .with_meta("answeredCount", answered)
            .with_meta("correctCount", correct)
            .with_meta(
                "caseSensitiveBlanks",
                content.blanks.iter().filter(|b| b.case_sensitive).count(),
            )
            .with_meta("responseShape", shape),
        )
    }

    fn structured_correct_answer(&self, question: &GeneratedQuestion) -> Option<StructuredAnswer> {
        let content = question.as_completion()?;
        let raw = QuestionResponse::Completion {
            answers: content
                .blanks
                .iter()
                .map(|b| BlankAnswer::new(b.id.clone(), b.primary_answer()))
                .collect(),
        }
        .to_raw();
        let accepted: usize = content.blanks.iter().map(|b| b.accepted_answers.len()).sum();

        Some(
            StructuredAnswer::new(QuestionType::Completion, raw, correct_answer_text(content))
                .with_meta("blankCount", content.blanks.len())
                .with_meta("acceptedAnswerCount", accepted),
        )
    }
}

impl PresentationHandler for CompletionHandler {
    fn render(&self, question: &GeneratedQuestion) -> String {
        let Some(content) = question.as_completion() else {
            return question.question.clone();
        };
        let mut out = question.question.clone();
        out.push_str("\n  ");
        out.push_str(&render_template(&content.template, |i| format!("[{}]", i + 1)));
        for (i, blank) in content.blanks.iter().enumerate() {
            if let Some(hint) = &blank.hint {
                out.push_str(&format!("\n  [{}] hint: {hint}", i + 1));
            }
        }
        out
    }

    fn input_hint(&self, question: &GeneratedQuestion) -> String {
        match question.as_completion().map(|c| c.blanks.len()) {
            Some(1) => "Fill in the blank".to_string(),
            Some(n) => format!("Fill in all {n} blanks"),
            None => "Fill in the blanks".to_string(),
        }
    }
}
