//! Aggregate score statistics over a graded quiz.
//!
//! Per-blank-count grouping reads `blankCount` from each answer's structured
//! record, the same field persistence-side analytics query on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{QuestionType, MAX_SCORE};
use crate::report::{AnswerStatus, GradedAnswer};

/// Running totals for one group of answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreStats {
    /// Answers in the group.
    pub count: usize,
    /// Answers with a full score.
    pub correct: usize,
    /// Sum of scores.
    pub total_score: f64,
    /// `total_score / count`, in `[0, 1]`.
    pub mean_score: f64,
}

impl ScoreStats {
    fn add(&mut self, score: f64, correct: bool) {
        self.count += 1;
        self.total_score += score;
        if correct {
            self.correct += 1;
        }
        self.mean_score = self.total_score / self.count as f64;
    }
}

/// Totals and breakdowns for a graded quiz.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub question_count: usize,
    /// Scored from a valid response.
    pub graded: usize,
    /// Missing or invalid response.
    pub unanswered: usize,
    /// No handler bundle for the type.
    pub unsupported: usize,
    /// Questions with a full score.
    pub correct: usize,
    pub total_score: f64,
    /// One point per question.
    pub max_score: f64,
    /// `total_score / max_score` as a percentage; 0 for an empty quiz.
    pub percentage: f64,
    /// Keyed by question type tag.
    pub per_type: BTreeMap<QuestionType, ScoreStats>,
    /// Keyed by the number of blanks in the question.
    pub per_blank_count: BTreeMap<u64, ScoreStats>,
}

pub fn compute_summary(answers: &[GradedAnswer]) -> ScoreSummary {
    let mut summary = ScoreSummary {
        question_count: answers.len(),
        max_score: answers.len() as f64 * MAX_SCORE,
        ..ScoreSummary::default()
    };

    for answer in answers {
        let evaluation = &answer.evaluation;
        match answer.status {
            AnswerStatus::Graded => summary.graded += 1,
            AnswerStatus::Unanswered => summary.unanswered += 1,
            AnswerStatus::Unsupported => summary.unsupported += 1,
        }
        if evaluation.is_correct {
            summary.correct += 1;
        }
        summary.total_score += evaluation.score;

        summary
            .per_type
            .entry(answer.question_type)
            .or_default()
            .add(evaluation.score, evaluation.is_correct);

        if let Some(blanks) = answer.blank_count() {
            summary
                .per_blank_count
                .entry(blanks)
                .or_default()
                .add(evaluation.score, evaluation.is_correct);
        }
    }

    if summary.max_score > 0.0 {
        summary.percentage = summary.total_score / summary.max_score * 100.0;
    }
    summary
}
