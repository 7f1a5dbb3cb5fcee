//! The `quizforge migrate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::Value;

use quizforge_core::migration::is_legacy_question;
use quizforge_core::parser::{parse_question_set_str, parse_response_sheet};

pub fn execute(input: PathBuf, responses: bool, output: Option<PathBuf>) -> Result<()> {
    let migrated = if responses {
        let sheet = parse_response_sheet(&input)?;
        eprintln!("Migrated {} response(s)", sheet.len());
        let map: serde_json::Map<String, Value> = sheet
            .iter()
            .map(|(index, response)| (index.to_string(), response.clone()))
            .collect();
        serde_json::to_string_pretty(&map)?
    } else {
        let content = std::fs::read_to_string(&input)
            .with_context(|| format!("failed to read {}", input.display()))?;
        let legacy = count_legacy_questions(&content);
        let set = parse_question_set_str(&content, &input)?;
        eprintln!(
            "Migrated {legacy} legacy question(s), {} total",
            set.questions.len()
        );
        serde_json::to_string_pretty(&set)?
    };

    match output {
        Some(path) => {
            std::fs::write(&path, migrated)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Written to: {}", path.display());
        }
        None => println!("{migrated}"),
    }

    Ok(())
}

fn count_legacy_questions(content: &str) -> usize {
    let Ok(value) = serde_json::from_str::<Value>(content) else {
        return 0;
    };
    let questions = match &value {
        Value::Array(items) => items,
        other => match other.get("questions").and_then(Value::as_array) {
            Some(items) => items,
            None => return 0,
        },
    };
    questions.iter().filter(|q| is_legacy_question(q)).count()
}
