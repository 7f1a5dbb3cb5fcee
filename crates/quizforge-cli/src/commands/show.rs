//! The `quizforge show` command.

use std::path::PathBuf;

use anyhow::Result;

use quizforge_core::parser::parse_question_set;
use quizforge_core::Presentation;

pub fn execute(
    question_set_path: PathBuf,
    position: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let engine = super::engine_from_config(config_path.as_deref())?;
    let set = parse_question_set(&question_set_path)?;

    if let Some(position) = position {
        anyhow::ensure!(
            (1..=set.questions.len()).contains(&position),
            "question {position} is out of range (set has {} questions)",
            set.questions.len()
        );
    }

    println!("{}", set.name);
    if !set.description.is_empty() {
        println!("{}", set.description);
    }
    println!();

    for (i, question) in set.questions.iter().enumerate() {
        if position.is_some_and(|p| p != i + 1) {
            continue;
        }

        println!("{}. [{}] {}", i + 1, question.question_type, question.id);
        match engine.present(question) {
            Presentation::Ready { prompt, input_hint } => {
                for line in prompt.lines() {
                    println!("   {line}");
                }
                println!("   ({input_hint})");
            }
            Presentation::Unsupported { message, .. } => println!("   [unsupported] {message}"),
            Presentation::Disabled { message, .. } => println!("   [disabled] {message}"),
        }
        println!();
    }

    Ok(())
}
