//! The `quizforge grade` command.

use std::path::PathBuf;

use anyhow::Result;

use quizforge_core::parser::{parse_question_set, parse_response_sheet};
use quizforge_core::report::QuizReport;

use crate::ReportFormat;

pub fn execute(
    question_set_path: PathBuf,
    responses_path: PathBuf,
    format: ReportFormat,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let engine = super::engine_from_config(config_path.as_deref())?;
    let set = parse_question_set(&question_set_path)?;
    let responses = parse_response_sheet(&responses_path)?;

    if responses.iter().any(|(index, _)| index >= set.questions.len()) {
        tracing::warn!(
            "response sheet has answers past the last question ({} questions)",
            set.questions.len()
        );
    }

    let report = engine.grade(&set, &responses);

    match format {
        ReportFormat::Table => print_summary(&report),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Markdown => println!("{}", report.to_markdown()),
    }

    if let Some(path) = output {
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_summary(report: &QuizReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "#",
        "Question",
        "Type",
        "Status",
        "Score",
        "Your answer",
        "Correct answer",
    ]);

    for answer in &report.answers {
        table.add_row(vec![
            Cell::new(answer.index + 1),
            Cell::new(&answer.question_id),
            Cell::new(answer.question_type),
            Cell::new(answer.status.as_str()),
            Cell::new(format!("{:.0}%", answer.evaluation.score * 100.0)),
            Cell::new(&answer.user_answer),
            Cell::new(&answer.correct_answer),
        ]);
    }

    let summary = &report.summary;
    println!("{}\n\n{table}", report.quiz.name);
    println!(
        "\nScore: {:.2} / {:.0} ({:.1}%)",
        summary.total_score, summary.max_score, summary.percentage
    );
    if summary.unanswered > 0 {
        println!("{} unanswered", summary.unanswered);
    }
    if summary.unsupported > 0 {
        println!("{} unsupported", summary.unsupported);
    }
}
