//! Graded quiz reports with JSON persistence and markdown review output.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{QuestionEvaluationResult, QuestionType, StructuredAnswer};
use crate::statistics::ScoreSummary;

/// How a question's evaluation was arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerStatus {
    /// A response was scored by the type's scorer.
    Graded,
    /// No usable response; the type's "no answer" evaluation was used.
    Unanswered,
    /// No handler bundle for the question's type.
    Unsupported,
}

impl AnswerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerStatus::Graded => "graded",
            AnswerStatus::Unanswered => "unanswered",
            AnswerStatus::Unsupported => "unsupported",
        }
    }
}

/// One question's evaluation plus everything needed to review it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAnswer {
    /// Position of the question in its set.
    pub index: usize,
    pub question_id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub status: AnswerStatus,
    pub evaluation: QuestionEvaluationResult,
    /// Formatted submission; a placeholder when unanswered.
    pub user_answer: String,
    /// Formatted acceptance set.
    pub correct_answer: String,
    /// Question explanation, else the evaluation feedback.
    pub explanation: String,
    /// Persistence record; `raw` keeps the submitted payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured: Option<StructuredAnswer>,
}

impl GradedAnswer {
    /// `blankCount` from the structured record, when the type records one.
    pub fn blank_count(&self) -> Option<u64> {
        self.structured
            .as_ref()?
            .metadata
            .get("blankCount")?
            .as_u64()
    }
}

/// The quiz a report was produced for, without its questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub id: String,
    pub name: String,
    /// Questions in the set, answered or not.
    pub question_count: usize,
}

/// A fully graded quiz attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizReport {
    pub id: Uuid,
    /// When grading finished.
    pub created_at: DateTime<Utc>,
    pub quiz: QuizSummary,
    /// One entry per question, in set order.
    pub answers: Vec<GradedAnswer>,
    pub summary: ScoreSummary,
}

impl QuizReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: QuizReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Render the report as a markdown review sheet.
    pub fn to_markdown(&self) -> String {
        let summary = &self.summary;
        let mut md = String::new();

        md.push_str(&format!("# {}\n\n", self.quiz.name));
        md.push_str(&format!(
            "**Score:** {:.2} / {:.0} ({:.1}%), {} fully correct\n\n",
            summary.total_score, summary.max_score, summary.percentage, summary.correct
        ));
        if summary.unanswered > 0 || summary.unsupported > 0 {
            md.push_str(&format!(
                "{} unanswered, {} unsupported\n\n",
                summary.unanswered, summary.unsupported
            ));
        }

        if !summary.per_type.is_empty() {
            md.push_str("## By type\n\n");
            md.push_str("| Type | Questions | Correct | Mean score |\n");
            md.push_str("|------|-----------|---------|------------|\n");
            for (question_type, stats) in &summary.per_type {
                md.push_str(&format!(
                    "| {} | {} | {} | {:.1}% |\n",
                    question_type,
                    stats.count,
                    stats.correct,
                    stats.mean_score * 100.0
                ));
            }
            md.push('\n');
        }

        if !self.answers.is_empty() {
            md.push_str("## Answers\n\n");
            md.push_str("| # | Type | Status | Score | Your answer | Correct answer |\n");
            md.push_str("|---|------|--------|-------|-------------|----------------|\n");
            for answer in &self.answers {
                md.push_str(&format!(
                    "| {} | {} | {} | {:.0}% | {} | {} |\n",
                    answer.index + 1,
                    answer.question_type,
                    answer.status.as_str(),
                    answer.evaluation.score * 100.0,
                    table_cell(&answer.user_answer),
                    table_cell(&answer.correct_answer),
                ));
            }
            md.push('\n');
        }

        let missed: Vec<&GradedAnswer> = self
            .answers
            .iter()
            .filter(|a| !a.evaluation.is_correct)
            .collect();
        if !missed.is_empty() {
            md.push_str("## Review\n\n");
            for answer in missed {
                md.push_str(&format!(
                    "- **Question {}** ({}): {}\n",
                    answer.index + 1,
                    answer.question_id,
                    answer.explanation
                ));
                if let Some(feedback) = &answer.evaluation.feedback {
                    md.push_str(&format!("  - {feedback}\n"));
                }
            }
        }

        md
    }
}

fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::compute_summary;

    fn graded(index: usize, question_type: QuestionType, score: f64) -> GradedAnswer {
        GradedAnswer {
            index,
            question_id: format!("q{}", index + 1),
            question_type,
            status: AnswerStatus::Graded,
            evaluation: QuestionEvaluationResult::new(question_type, score)
                .with_feedback(format!("feedback {index}")),
            user_answer: "B. Paris".into(),
            correct_answer: "B. Paris".into(),
            explanation: format!("explanation {index}"),
            structured: None,
        }
    }

    fn make_report(answers: Vec<GradedAnswer>) -> QuizReport {
        QuizReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            quiz: QuizSummary {
                id: "geo".into(),
                name: "Geography".into(),
                question_count: answers.len(),
            },
            summary: compute_summary(&answers),
            answers,
        }
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report(vec![graded(0, QuestionType::MultipleChoice, 1.0)]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = QuizReport::load_json(&path).unwrap();

        assert_eq!(loaded.quiz.id, "geo");
        assert_eq!(loaded.answers, report.answers);
        assert_eq!(loaded.summary, report.summary);
    }

    #[test]
    fn json_uses_camel_case() {
        let report = make_report(vec![graded(0, QuestionType::Completion, 0.5)]);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["quiz"]["questionCount"], 1);
        assert_eq!(json["answers"][0]["questionId"], "q1");
        assert_eq!(json["answers"][0]["type"], "completion");
        assert_eq!(json["answers"][0]["status"], "graded");
        assert_eq!(json["answers"][0]["evaluation"]["isCorrect"], false);
    }

    #[test]
    fn load_missing_file_fails_with_context() {
        let err = QuizReport::load_json(Path::new("/no/such/report.json")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read report"));
    }

    #[test]
    fn markdown_lists_answers_and_review() {
        let mut missed = graded(1, QuestionType::Completion, 0.5);
        missed.user_answer = "1:\"a\" | 2:\"b\"".into();
        let report = make_report(vec![graded(0, QuestionType::MultipleChoice, 1.0), missed]);
        let md = report.to_markdown();

        assert!(md.starts_with("# Geography"));
        assert!(md.contains("| multiple-choice | 1 | 1 | 100.0% |"));
        assert!(md.contains("| 2 | completion | graded | 50% |"));
        assert!(md.contains("\\|"));
        assert!(md.contains("## Review"));
        assert!(md.contains("**Question 2** (q2): explanation 1"));
        assert!(!md.contains("**Question 1**"));
    }

    #[test]
    fn blank_count_from_structured_metadata() {
        let mut answer = graded(0, QuestionType::Completion, 1.0);
        assert_eq!(answer.blank_count(), None);
        answer.structured = Some(
            StructuredAnswer::new(QuestionType::Completion, serde_json::Value::Null, "")
                .with_meta("blankCount", 3),
        );
        assert_eq!(answer.blank_count(), Some(3));
    }
}
