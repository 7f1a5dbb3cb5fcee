//! End-to-end grading pipeline over the bundled question sets.
//!
//! Parse a set, parse a response sheet, grade it, persist the report and
//! read it back, all through the library surface the CLI uses.

use std::path::Path;

use quizforge_core::config::EngineConfig;
use quizforge_core::parser::{
    load_question_directory, parse_question_set, parse_response_sheet, parse_response_sheet_str,
    validate_question_set,
};
use quizforge_core::report::{AnswerStatus, QuizReport};
use quizforge_core::{QuestionType, QuizEngine};

const QUESTION_SETS: &str = "../../question-sets";

fn question_set(name: &str) -> std::path::PathBuf {
    Path::new(QUESTION_SETS).join(name)
}

#[test]
fn bundled_sets_load_from_directory() {
    let sets = load_question_directory(Path::new(QUESTION_SETS)).unwrap();
    let mut ids: Vec<&str> = sets.iter().map(|s| s.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, ["arithmetic", "capitals", "preview", "weather"]);
}

#[test]
fn grade_weather_sheet() {
    let engine = QuizEngine::with_builtin_types();
    let set = parse_question_set(&question_set("weather.json")).unwrap();
    assert!(validate_question_set(&set, engine.registry()).is_empty());

    let responses = parse_response_sheet(Path::new("../../responses/weather.json")).unwrap();
    let report = engine.grade(&set, &responses);

    let statuses: Vec<AnswerStatus> = report.answers.iter().map(|a| a.status).collect();
    assert_eq!(
        statuses,
        [
            AnswerStatus::Graded,
            AnswerStatus::Graded,
            AnswerStatus::Unanswered,
            AnswerStatus::Graded,
            AnswerStatus::Graded,
            AnswerStatus::Graded,
        ]
    );

    let scores: Vec<f64> = report.answers.iter().map(|a| a.evaluation.score).collect();
    assert_eq!(scores, [1.0, 0.0, 0.0, 0.5, 1.0, 0.0]);

    let summary = &report.summary;
    assert_eq!(summary.question_count, 6);
    assert_eq!(summary.correct, 2);
    assert!((summary.total_score - 2.5).abs() < 1e-9);
    assert_eq!(summary.per_type[&QuestionType::MultipleChoice].count, 3);
    assert_eq!(summary.per_type[&QuestionType::Completion].count, 3);
    assert_eq!(summary.per_blank_count[&1].count, 2);
    assert_eq!(summary.per_blank_count[&2].count, 1);

    let partial = report.answers[3].evaluation.partial_credit.as_ref().unwrap();
    assert_eq!(partial.earned, 1);
    assert_eq!(partial.possible, 2);

    // Drifted blank id still matched by position.
    assert_eq!(report.answers[4].structured.as_ref().unwrap().metadata["blankCount"], 1);
}

#[test]
fn report_survives_save_and_load() {
    let engine = QuizEngine::with_builtin_types();
    let set = parse_question_set(&question_set("weather.json")).unwrap();
    let responses = parse_response_sheet(Path::new("../../responses/weather.json")).unwrap();
    let report = engine.grade(&set, &responses);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weather-report.json");
    report.save_json(&path).unwrap();
    let loaded = QuizReport::load_json(&path).unwrap();

    assert_eq!(loaded.id, report.id);
    assert_eq!(loaded.answers, report.answers);
    assert_eq!(loaded.summary.correct, report.summary.correct);
    assert!((loaded.summary.percentage - report.summary.percentage).abs() < 1e-9);
    assert!(loaded.to_markdown().contains("**Score:** 2.50 / 6 (41.7%)"));
}

#[test]
fn legacy_set_and_sheet_grade_like_tagged() {
    let engine = QuizEngine::with_builtin_types();
    let set = parse_question_set(&question_set("legacy/arithmetic.json")).unwrap();
    assert!(set
        .questions
        .iter()
        .all(|q| q.question_type == QuestionType::MultipleChoice));

    let responses = parse_response_sheet_str(
        r#"{ "0": { "answer": "B" }, "1": { "selectedAnswer": "c" }, "2": { "answer": " C " } }"#,
    )
    .unwrap();
    let report = engine.grade(&set, &responses);

    let correct: Vec<bool> = report
        .answers
        .iter()
        .map(|a| a.evaluation.is_correct)
        .collect();
    assert_eq!(correct, [true, false, true]);
    assert_eq!(report.answers[0].correct_answer, "B. 56");
}

#[test]
fn unsupported_and_disabled_types() {
    let set = parse_question_set(&question_set("preview.json")).unwrap();
    let responses = parse_response_sheet_str(r#"{ "0": { "answer": "D" }, "1": {} }"#).unwrap();

    let report = QuizEngine::with_builtin_types().grade(&set, &responses);
    assert_eq!(report.answers[0].status, AnswerStatus::Graded);
    assert_eq!(report.answers[1].status, AnswerStatus::Unsupported);
    assert_eq!(report.summary.unsupported, 1);
    assert_eq!(
        report.answers[1].evaluation.feedback.as_deref(),
        Some("Question type \"matching\" is not supported yet.")
    );

    let config =
        EngineConfig::from_toml_str("[types.multiple-choice]\nenabled = false\n").unwrap();
    let engine = QuizEngine::from_config(&config);
    assert!(!engine.enabled_types().contains(&QuestionType::MultipleChoice));

    let report = engine.grade(&set, &responses);
    assert_eq!(report.answers[0].status, AnswerStatus::Graded);
    assert!(report.answers[0].evaluation.is_correct);
}
