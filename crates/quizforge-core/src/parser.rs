//! Question set and response sheet loading.
//!
//! Question sets load from JSON (a bare array of questions, or an object with
//! `id`/`name`/`description`/`questions`) or TOML (`[quiz]` header plus
//! `[[questions]]`). Every question goes through legacy auto-migration, so
//! flat multiple-choice questions load alongside tagged ones.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::migration::{auto_migrate_question, auto_migrate_response};
use crate::model::{GeneratedQuestion, QuestionContent, ResponseSheet};
use crate::registry::QuestionTypeRegistry;
use crate::types::completion::count_blank_markers;

/// Number of options a multiple-choice question is expected to carry.
const EXPECTED_OPTION_COUNT: usize = 4;

/// A named, ordered list of questions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionSet {
    /// Header id, else the file stem.
    pub id: String,
    /// Header name, else the id.
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Already migrated to the tagged shape.
    pub questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Default, Deserialize)]
struct SetHeader {
    id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct SetDocument {
    /// TOML files carry the header in a `[quiz]` table.
    #[serde(default)]
    quiz: Option<SetHeader>,
    #[serde(flatten)]
    inline: SetHeader,
    questions: Vec<Value>,
}

/// Parse a single `.json` or `.toml` file into a `QuestionSet`.
pub fn parse_question_set(path: &Path) -> Result<QuestionSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question set file: {}", path.display()))?;

    parse_question_set_str(&content, path)
}

/// Parse question set text; the format is picked from `source_path`'s extension.
pub fn parse_question_set_str(content: &str, source_path: &Path) -> Result<QuestionSet> {
    let value: Value = if source_path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?
    } else {
        serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?
    };

    let (header, raw_questions) = match value {
        Value::Array(items) => (SetHeader::default(), items),
        other => {
            let document: SetDocument = serde_json::from_value(other).with_context(|| {
                format!("not a question set: {}", source_path.display())
            })?;
            (document.quiz.unwrap_or(document.inline), document.questions)
        }
    };

    let questions = raw_questions
        .into_iter()
        .enumerate()
        .map(|(i, raw)| {
            auto_migrate_question(raw).with_context(|| {
                format!("{}: question {} is invalid", source_path.display(), i + 1)
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let stem = source_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "quiz".to_string());
    let id = header.id.unwrap_or(stem);
    let name = header.name.unwrap_or_else(|| id.clone());

    Ok(QuestionSet {
        id,
        name,
        description: header.description,
        questions,
    })
}

/// Recursively load all `.json` and `.toml` question sets from a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_question_directory(dir: &Path) -> Result<Vec<QuestionSet>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    let mut sets = Vec::new();
    for path in paths {
        if path.is_dir() {
            sets.extend(load_question_directory(&path)?);
        } else if path
            .extension()
            .is_some_and(|ext| ext == "json" || ext == "toml")
        {
            match parse_question_set(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {e:#}", path.display());
                }
            }
        }
    }

    Ok(sets)
}

/// A warning from question set validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    pub message: String,
}

impl ValidationWarning {
    fn question(question: &GeneratedQuestion, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(question.id.clone()),
            message: message.into(),
        }
    }
}

/// Check a question set for authoring mistakes the loader tolerates.
pub fn validate_question_set(
    set: &QuestionSet,
    registry: &QuestionTypeRegistry,
) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if set.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "question set has no questions".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for question in &set.questions {
        if !seen_ids.insert(&question.id) {
            warnings.push(ValidationWarning::question(
                question,
                format!("duplicate question ID: {}", question.id),
            ));
        }
        if question.question.trim().is_empty() {
            warnings.push(ValidationWarning::question(question, "prompt is empty"));
        }

        let question_type = question.question_type;
        if !registry.is_registered(question_type) {
            warnings.push(ValidationWarning::question(
                question,
                format!("no handler registered for type {question_type}"),
            ));
        } else if !registry.is_enabled(question_type) {
            warnings.push(ValidationWarning::question(
                question,
                format!("type {question_type} is disabled"),
            ));
        }

        match &question.content {
            QuestionContent::MultipleChoice(content) => {
                if content.options.len() != EXPECTED_OPTION_COUNT {
                    warnings.push(ValidationWarning::question(
                        question,
                        format!(
                            "expected {EXPECTED_OPTION_COUNT} options, found {}",
                            content.options.len()
                        ),
                    ));
                }
                if content.correct_answer.index() >= content.options.len() {
                    warnings.push(ValidationWarning::question(
                        question,
                        format!(
                            "correct answer {} is not among the {} options",
                            content.correct_answer,
                            content.options.len()
                        ),
                    ));
                }
            }
            QuestionContent::Completion(content) => {
                if content.blanks.is_empty() {
                    warnings.push(ValidationWarning::question(question, "no blanks defined"));
                }
                let markers = count_blank_markers(&content.template);
                if markers != content.blanks.len() {
                    warnings.push(ValidationWarning::question(
                        question,
                        format!(
                            "template has {markers} blank markers but {} blanks are defined",
                            content.blanks.len()
                        ),
                    ));
                }
                let mut blank_ids = HashSet::new();
                for blank in &content.blanks {
                    if !blank_ids.insert(&blank.id) {
                        warnings.push(ValidationWarning::question(
                            question,
                            format!("duplicate blank ID: {}", blank.id),
                        ));
                    }
                    if blank.position > content.template.len() {
                        warnings.push(ValidationWarning::question(
                            question,
                            format!(
                                "blank {} position {} is past the end of the template",
                                blank.id, blank.position
                            ),
                        ));
                    }
                }
            }
            QuestionContent::Opaque(_) => {}
        }
    }

    warnings
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetEntry {
    question_index: usize,
    response: Value,
}

/// Parse a response sheet file.
pub fn parse_response_sheet(path: &Path) -> Result<ResponseSheet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read response sheet: {}", path.display()))?;
    parse_response_sheet_str(&content)
        .with_context(|| format!("invalid response sheet: {}", path.display()))
}

/// Parse a response sheet from JSON.
///
/// Accepts an object keyed by question index, or an array of
/// `{ questionIndex, response }` entries applied in order, so a later entry
/// for the same index replaces an earlier one.
pub fn parse_response_sheet_str(content: &str) -> Result<ResponseSheet> {
    let value: Value = serde_json::from_str(content).context("failed to parse JSON")?;
    let mut sheet = ResponseSheet::new();

    match value {
        Value::Array(_) => {
            let entries: Vec<SheetEntry> =
                serde_json::from_value(value).context("invalid response entry")?;
            for entry in entries {
                sheet.record(entry.question_index, auto_migrate_response(entry.response));
            }
        }
        Value::Object(mut fields) => {
            // The serialized form of `ResponseSheet` wraps the map.
            if fields.len() == 1 && fields.get("responses").is_some_and(Value::is_object) {
                if let Some(Value::Object(inner)) = fields.remove("responses") {
                    fields = inner;
                }
            }
            for (key, response) in fields {
                let index: usize = key
                    .trim()
                    .parse()
                    .with_context(|| format!("response key {key:?} is not a question index"))?;
                sheet.record(index, auto_migrate_response(response));
            }
        }
        _ => anyhow::bail!("expected an object or array of responses"),
    }

    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OptionLetter, QuestionType};
    use serde_json::json;
    use std::path::PathBuf;

    const TAGGED_JSON: &str = r#"{
  "id": "weather",
  "name": "Weather words",
  "questions": [
    {
      "id": "mc-1",
      "type": "multiple-choice",
      "question": "Which is a colour?",
      "content": { "options": ["Blue", "Loud", "Fast", "Soft"], "correctAnswer": "A" }
    },
    {
      "id": "fb-1",
      "type": "completion",
      "question": "Complete the sentence.",
      "content": {
        "template": "It was a ___ day, so we went to the ___.",
        "blanks": [
          { "id": "b1", "position": 9, "acceptedAnswers": ["sunny", "nice"] },
          { "id": "b2", "position": 37, "answer": "park", "alternatives": ["beach"] }
        ]
      }
    }
  ]
}"#;

    const VALID_TOML: &str = r#"
[quiz]
id = "capitals"
name = "Capitals"
description = "European capitals"

[[questions]]
id = "fr"
type = "multiple-choice"
question = "What is the capital of France?"
difficulty = "easy"

[questions.content]
options = ["Berlin", "Paris", "Rome", "Madrid"]
correctAnswer = "B"

[[questions]]
id = "it"
type = "fill-blank"
question = "Fill in the capital."

[questions.content]
template = "The capital of Italy is ___."

[[questions.content.blanks]]
id = "b1"
position = 24
answer = "Rome"
alternatives = ["Roma"]
"#;

    #[test]
    fn parse_tagged_json() {
        let set = parse_question_set_str(TAGGED_JSON, &PathBuf::from("weather.json")).unwrap();
        assert_eq!(set.id, "weather");
        assert_eq!(set.name, "Weather words");
        assert_eq!(set.questions.len(), 2);
        let blanks = &set.questions[1].as_completion().unwrap().blanks;
        assert_eq!(blanks[1].accepted_answers, vec!["park", "beach"]);
    }

    #[test]
    fn parse_toml_with_header() {
        let set = parse_question_set_str(VALID_TOML, &PathBuf::from("capitals.toml")).unwrap();
        assert_eq!(set.id, "capitals");
        assert_eq!(set.description, "European capitals");
        assert_eq!(set.questions[0].question_type, QuestionType::MultipleChoice);
        assert_eq!(set.questions[1].question_type, QuestionType::Completion);
        assert_eq!(
            set.questions[1].as_completion().unwrap().blanks[0].accepted_answers,
            vec!["Rome", "Roma"]
        );
    }

    #[test]
    fn bare_legacy_array_takes_file_stem() {
        let legacy = r#"[
            { "question": "2 + 2?", "options": ["3", "4", "5", "6"], "answer": "B" },
            { "id": "q2", "question": "Red?", "options": ["red", "blue", "green", "grey"], "answer": 0 }
        ]"#;
        let set = parse_question_set_str(legacy, &PathBuf::from("sets/arith.json")).unwrap();
        assert_eq!(set.id, "arith");
        assert_eq!(set.name, "arith");
        assert_eq!(
            set.questions[1].as_multiple_choice().unwrap().correct_answer,
            OptionLetter::A
        );
    }

    #[test]
    fn invalid_question_names_its_position() {
        let bad = r#"[{ "id": "x", "type": "completion", "question": "?",
            "content": { "template": "___", "blanks": [{ "id": "b1" }] } }]"#;
        let err = parse_question_set_str(bad, &PathBuf::from("bad.json")).unwrap_err();
        assert!(format!("{err:#}").contains("question 1 is invalid"));
    }

    #[test]
    fn parse_malformed_files() {
        let bad_toml =
            parse_question_set_str("this is not [valid toml }{", &PathBuf::from("bad.toml"));
        assert!(bad_toml.is_err());
        assert!(parse_question_set_str("{", &PathBuf::from("bad.json")).is_err());
        let no_questions =
            parse_question_set_str(r#"{ "name": "no questions" }"#, &PathBuf::from("x.json"));
        assert!(no_questions.is_err());
    }

    #[test]
    fn validate_catches_authoring_mistakes() {
        let registry = QuestionTypeRegistry::with_builtin_types();
        let questions = json!([
            { "id": "dup", "type": "multiple-choice", "question": "",
              "content": { "options": ["a", "b", "c"], "correctAnswer": "D" } },
            { "id": "dup", "type": "completion", "question": "Fill",
              "content": { "template": "one ___ two", "blanks": [
                  { "id": "b1", "position": 4, "answer": "x" },
                  { "id": "b1", "position": 99, "answer": "y" }
              ] } },
            { "id": "m1", "type": "matching", "question": "Match", "content": {} }
        ]);
        let set = parse_question_set_str(&questions.to_string(), &PathBuf::from("x.json")).unwrap();
        let messages: Vec<String> = validate_question_set(&set, &registry)
            .into_iter()
            .map(|w| w.message)
            .collect();

        let has = |needle: &str| messages.iter().any(|m| m.contains(needle));
        assert!(has("duplicate question ID: dup"));
        assert!(has("prompt is empty"));
        assert!(has("expected 4 options, found 3"));
        assert!(has("correct answer D is not among the 3 options"));
        assert!(has("1 blank markers but 2 blanks"));
        assert!(has("duplicate blank ID: b1"));
        assert!(has("past the end of the template"));
        assert!(has("no handler registered for type matching"));
    }

    #[test]
    fn validate_flags_disabled_types() {
        let mut registry = QuestionTypeRegistry::with_builtin_types();
        registry.set_enabled(QuestionType::Completion, false).unwrap();
        let set = parse_question_set_str(TAGGED_JSON, &PathBuf::from("w.json")).unwrap();
        let warnings = validate_question_set(&set, &registry);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].question_id.as_deref(), Some("fb-1"));
        assert!(warnings[0].message.contains("disabled"));
    }

    #[test]
    fn load_directory_recurses_and_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("capitals.toml"), VALID_TOML).unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("weather.json"), TAGGED_JSON).unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let sets = load_question_directory(dir.path()).unwrap();
        let ids: Vec<&str> = sets.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["capitals", "weather"]);
    }

    #[test]
    fn response_sheet_object_form() {
        let sheet = parse_response_sheet_str(
            r#"{ "0": { "answer": "b" }, "1": { "type": "completion", "answers": [] } }"#,
        )
        .unwrap();
        assert_eq!(sheet.len(), 2);
        assert_eq!(
            sheet.get(0),
            Some(&json!({ "type": "multiple-choice", "selectedOption": "b" }))
        );
    }

    #[test]
    fn response_sheet_entries_last_write_wins() {
        let sheet = parse_response_sheet_str(
            r#"[
                { "questionIndex": 0, "response": { "answer": "A" } },
                { "questionIndex": 0, "response": { "answer": "C" } }
            ]"#,
        )
        .unwrap();
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet.get(0).unwrap()["selectedOption"], "C");
    }

    #[test]
    fn response_sheet_roundtrips_serialized_form() {
        let mut sheet = ResponseSheet::new();
        sheet.record(2, json!({ "type": "multiple-choice", "selectedOption": "D" }));
        let text = serde_json::to_string(&sheet).unwrap();
        assert_eq!(parse_response_sheet_str(&text).unwrap(), sheet);
    }

    #[test]
    fn response_sheet_rejects_bad_keys() {
        assert!(parse_response_sheet_str(r#"{ "first": {} }"#).is_err());
        assert!(parse_response_sheet_str("42").is_err());
    }
}
