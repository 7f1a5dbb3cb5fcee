//! The `quizforge validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizforge_core::parser::validate_question_set;

pub fn execute(question_set_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let engine = super::engine_from_config(config_path.as_deref())?;
    let sets = super::load_sets(&question_set_path)?;

    if sets.is_empty() {
        println!("No question sets found in {}", question_set_path.display());
        return Ok(());
    }

    let mut total_warnings = 0;

    for set in &sets {
        println!("Question set: {} ({} questions)", set.name, set.questions.len());

        let warnings = validate_question_set(set, engine.registry());
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All question sets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
