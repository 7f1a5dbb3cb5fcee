pub mod grade;
pub mod init;
pub mod migrate;
pub mod show;
pub mod types;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use quizforge_core::config::load_config_from;
use quizforge_core::parser::{load_question_directory, parse_question_set, QuestionSet};
use quizforge_core::QuizEngine;

/// Build an engine with the configured type toggles applied.
pub fn engine_from_config(config_path: Option<&Path>) -> Result<QuizEngine> {
    let config = load_config_from(config_path)?;
    Ok(QuizEngine::from_config(&config))
}

/// Load one question set file, or every set under a directory.
pub fn load_sets(path: &Path) -> Result<Vec<QuestionSet>> {
    if path.is_dir() {
        load_question_directory(path)
    } else {
        Ok(vec![parse_question_set(path)?])
    }
}
