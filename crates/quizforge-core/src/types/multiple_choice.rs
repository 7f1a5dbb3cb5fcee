//! Multiple-choice questions: four options, exactly one correct.

use serde_json::{json, Value};

use crate::format::UNKNOWN_ANSWER;
use crate::model::{
    GeneratedQuestion, MultipleChoiceContent, OptionLetter, QuestionEvaluationResult,
    QuestionType, StructuredAnswer,
};
use crate::registry::QuestionTypeRegistry;
use crate::traits::{
    HandlerBundle, PresentationHandler, ResponseValidator, ResultFormatter, Scorer, TypeMetadata,
};

use super::{content_mismatch, response_tag};

pub const CORRECT_FEEDBACK: &str = "Correct!";

pub const NO_SELECTION: &str = "No answer selected";

/// Validator, scorer, formatter and presentation for `multiple-choice`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultipleChoiceHandler;

pub fn metadata() -> TypeMetadata {
    TypeMetadata::new(
        "Multiple Choice",
        "Pick the single correct option out of four.",
    )
}

pub fn register(registry: &mut QuestionTypeRegistry) {
    registry.register(
        QuestionType::MultipleChoice,
        HandlerBundle::from_handler(metadata(), MultipleChoiceHandler).with_production_ready(true),
    );
}

fn selected_option(response: &Value) -> Option<&str> {
    response
        .get("selectedOption")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// "B. Paris" when the option has text, else just "B".
fn describe_option(content: &MultipleChoiceContent, letter: OptionLetter) -> String {
    match content.option_text(letter) {
        Some(text) => format!("{letter}. {text}"),
        None => letter.to_string(),
    }
}

impl ResponseValidator for MultipleChoiceHandler {
    fn validate(&self, response: &Value) -> bool {
        response.is_object()
            && response_tag(response) == Some(QuestionType::MultipleChoice)
            && selected_option(response).is_some()
    }
}

impl Scorer for MultipleChoiceHandler {
    fn score(&self, question: &GeneratedQuestion, response: &Value) -> QuestionEvaluationResult {
        let Some(content) = question.as_multiple_choice() else {
            return content_mismatch(question);
        };

        let selected = selected_option(response).and_then(|s| s.parse::<OptionLetter>().ok());
        let correct = selected == Some(content.correct_answer);
        let score = if correct { 1.0 } else { 0.0 };

        let feedback = if correct {
            CORRECT_FEEDBACK.to_string()
        } else {
            format!(
                "Incorrect. The correct answer is {}.",
                describe_option(content, content.correct_answer)
            )
        };

        QuestionEvaluationResult::new(QuestionType::MultipleChoice, score)
            .with_correct_answer(content.correct_answer.to_string())
            .with_feedback(feedback)
    }

    fn unanswered(&self, question: &GeneratedQuestion) -> QuestionEvaluationResult {
        let Some(content) = question.as_multiple_choice() else {
            return content_mismatch(question);
        };
        QuestionEvaluationResult::new(QuestionType::MultipleChoice, 0.0)
            .with_correct_answer(content.correct_answer.to_string())
            .with_feedback(format!(
                "No answer selected. The correct answer is {}.",
                describe_option(content, content.correct_answer)
            ))
    }
}

impl ResultFormatter for MultipleChoiceHandler {
    fn format_user_answer(&self, question: &GeneratedQuestion, response: &Value) -> String {
        let Some(selected) = selected_option(response) else {
            return NO_SELECTION.to_string();
        };
        match (question.as_multiple_choice(), selected.parse::<OptionLetter>()) {
            (Some(content), Ok(letter)) => describe_option(content, letter),
            _ => selected.to_string(),
        }
    }

    fn format_correct_answer(&self, question: &GeneratedQuestion) -> String {
        question
            .as_multiple_choice()
            .map(|content| describe_option(content, content.correct_answer))
            .unwrap_or_else(|| UNKNOWN_ANSWER.to_string())
    }

    fn structured_user_answer(
        &self,
        question: &GeneratedQuestion,
        response: &Value,
        evaluation: &QuestionEvaluationResult,
    ) -> Option<StructuredAnswer> {
        let content = question.as_multiple_choice()?;
        let selected = selected_option(response)
            .and_then(|s| s.parse::<OptionLetter>().ok())
            .map(|letter| Value::from(letter.as_str()))
            .unwrap_or(Value::Null);

        Some(
            StructuredAnswer::new(
                QuestionType::MultipleChoice,
                response.clone(),
                self.format_user_answer(question, response),
            )
            .with_meta("optionCount", content.options.len())
            .with_meta("selectedOption", selected)
            .with_meta("correctOption", content.correct_answer.as_str())
            .with_meta("isCorrect", evaluation.is_correct),
        )
    }

    fn structured_correct_answer(&self, question: &GeneratedQuestion) -> Option<StructuredAnswer> {
        let content = question.as_multiple_choice()?;
        Some(
            StructuredAnswer::new(
                QuestionType::MultipleChoice,
                json!({
                    "type": QuestionType::MultipleChoice.as_str(),
                    "selectedOption": content.correct_answer.as_str(),
                }),
                describe_option(content, content.correct_answer),
            )
            .with_meta("optionCount", content.options.len()),
        )
    }
}

impl PresentationHandler for MultipleChoiceHandler {
    fn render(&self, question: &GeneratedQuestion) -> String {
        let mut out = question.question.clone();
        if let Some(content) = question.as_multiple_choice() {
            for (letter, text) in OptionLetter::ALL.iter().zip(&content.options) {
                out.push_str(&format!("\n  {letter}. {}", text.trim()));
            }
        }
        out
    }

    fn input_hint(&self, question: &GeneratedQuestion) -> String {
        let count = question
            .as_multiple_choice()
            .map(|c| c.options.len().min(OptionLetter::ALL.len()))
            .unwrap_or(OptionLetter::ALL.len());
        let letters: Vec<&str> = OptionLetter::ALL[..count]
            .iter()
            .map(OptionLetter::as_str)
            .collect();
        format!("Select one option: {}", letters.join(", "))
    }
}
