//! Conversion between the legacy multiple-choice-only shape and the tagged shape.
//!
//! Before the registry existed, every question was multiple choice and stored
//! flat: `{ question, options, answer, explanation }`, with responses stored as
//! `{ answer }`. Ingress runs [`auto_migrate_question`] / [`auto_migrate_response`]
//! on anything externally sourced; both pass already-tagged input through.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::MigrationError;
use crate::model::{
    Difficulty, GeneratedQuestion, MultipleChoiceContent, OptionLetter, QuestionContent,
    QuestionResponse, QuestionType,
};

/// A question in the pre-registry flat shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyQuestion {
    /// Older exports sometimes omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub question: String,
    /// Option texts in A-D order.
    pub options: Vec<String>,
    /// Letter, zero-based index, or the text of the correct option.
    #[serde(alias = "correctAnswer")]
    pub answer: Value,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

/// A response in the pre-registry flat shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyResponse {
    /// Selected letter, as typed by the user.
    #[serde(alias = "selectedAnswer")]
    pub answer: String,
}

fn has_tag(fields: &serde_json::Map<String, Value>) -> bool {
    fields.contains_key("type") || fields.contains_key("questionType")
}

/// Flat `options`/`answer` fields and no tagged `content`/`type` fields.
pub fn is_legacy_question(value: &Value) -> bool {
    let Value::Object(fields) = value else {
        return false;
    };
    (fields.contains_key("options") || fields.contains_key("answer"))
        && !fields.contains_key("content")
        && !has_tag(fields)
}

/// A flat `answer` (or `selectedAnswer`) field and no tag field.
pub fn is_legacy_response(value: &Value) -> bool {
    let Value::Object(fields) = value else {
        return false;
    };
    (fields.contains_key("answer") || fields.contains_key("selectedAnswer")) && !has_tag(fields)
}

fn resolve_answer(answer: &Value, options: &[String]) -> Result<OptionLetter, MigrationError> {
    let unresolvable = || MigrationError::UnresolvableAnswer {
        answer: match answer {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
        option_count: options.len(),
    };

    let letter = match answer {
        Value::Number(n) => n
            .as_u64()
            .and_then(|i| OptionLetter::from_index(i as usize)),
        Value::String(s) => s.parse::<OptionLetter>().ok().or_else(|| {
            let wanted = s.trim().to_lowercase();
            options
                .iter()
                .position(|option| option.trim().to_lowercase() == wanted)
                .and_then(OptionLetter::from_index)
        }),
        _ => None,
    };

    match letter {
        Some(letter) if options.is_empty() || letter.index() < options.len() => Ok(letter),
        _ => Err(unresolvable()),
    }
}

/// Convert a legacy question 1:1 into a tagged multiple-choice question.
///
/// Legacy questions without an id get a fresh UUID.
pub fn migrate_legacy_question(
    legacy: LegacyQuestion,
) -> Result<GeneratedQuestion, MigrationError> {
    let correct_answer = resolve_answer(&legacy.answer, &legacy.options)?;
    Ok(GeneratedQuestion {
        id: legacy
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        question_type: QuestionType::MultipleChoice,
        question: legacy.question,
        difficulty: legacy.difficulty.unwrap_or_default(),
        explanation: legacy.explanation,
        source_context: None,
        content: QuestionContent::MultipleChoice(MultipleChoiceContent {
            options: legacy.options,
            correct_answer,
        }),
    })
}

pub fn migrate_legacy_response(legacy: LegacyResponse) -> QuestionResponse {
    QuestionResponse::MultipleChoice {
        selected_option: legacy.answer.trim().to_string(),
    }
}

/// Parse a question from either shape.
pub fn auto_migrate_question(value: Value) -> Result<GeneratedQuestion, MigrationError> {
    if is_legacy_question(&value) {
        let legacy: LegacyQuestion = serde_json::from_value(value)?;
        tracing::debug!(id = ?legacy.id, "migrating legacy question");
        return migrate_legacy_question(legacy);
    }
    Ok(serde_json::from_value(value)?)
}

/// Rewrite a legacy response into the tagged shape; anything else passes
/// through untouched, including responses that cannot be read as legacy.
pub fn auto_migrate_response(value: Value) -> Value {
    if !is_legacy_response(&value) {
        return value;
    }
    match serde_json::from_value::<LegacyResponse>(value.clone()) {
        Ok(legacy) => migrate_legacy_response(legacy).to_raw(),
        Err(e) => {
            tracing::warn!("legacy-looking response could not be migrated: {e}");
            value
        }
    }
}

/// Downgrade a tagged response to the legacy shape.
///
/// Only multiple choice ever had a legacy shape; every other tag fails.
pub fn convert_to_legacy_response(
    response: &QuestionResponse,
) -> Result<LegacyResponse, MigrationError> {
    match response {
        QuestionResponse::MultipleChoice { selected_option } => Ok(LegacyResponse {
            answer: selected_option.clone(),
        }),
        other => Err(MigrationError::NotImplemented(other.question_type())),
    }
}
