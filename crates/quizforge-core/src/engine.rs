//! The quiz engine facade.
//!
//! Routes every operation through the registry by `question.type`. Nothing
//! here returns an error: unregistered types get an "unsupported" evaluation
//! and the fallback formatter, and invalid responses get the type's
//! "no answer" evaluation.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::RegistryError;
use crate::format::FallbackFormatter;
use crate::migration::auto_migrate_response;
use crate::model::{
    GeneratedQuestion, QuestionEvaluationResult, QuestionType, ResponseSheet, StructuredAnswer,
};
use crate::parser::QuestionSet;
use crate::registry::{QuestionTypeRegistry, TypeStatus};
use crate::report::{AnswerStatus, GradedAnswer, QuizReport, QuizSummary};
use crate::statistics::compute_summary;
use crate::traits::HandlerBundle;

/// What the UI should show for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Presentation {
    #[serde(rename_all = "camelCase")]
    Ready { prompt: String, input_hint: String },
    /// No handler bundle for the question's type.
    #[serde(rename_all = "camelCase")]
    Unsupported {
        question_type: QuestionType,
        message: String,
    },
    /// Registered but switched off.
    #[serde(rename_all = "camelCase")]
    Disabled {
        question_type: QuestionType,
        message: String,
    },
}

/// Registry-backed validation, scoring, formatting and grading.
#[derive(Debug, Clone)]
pub struct QuizEngine {
    registry: Arc<QuestionTypeRegistry>,
    fallback: FallbackFormatter,
}

impl QuizEngine {
    pub fn new(registry: Arc<QuestionTypeRegistry>) -> Self {
        Self {
            registry,
            fallback: FallbackFormatter,
        }
    }

    /// An engine over the built-in types with their default flags.
    pub fn with_builtin_types() -> Self {
        Self::new(Arc::new(QuestionTypeRegistry::with_builtin_types()))
    }

    /// An engine over the built-in types with `config` toggles applied.
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut registry = QuestionTypeRegistry::with_builtin_types();
        config.apply(&mut registry);
        Self::new(Arc::new(registry))
    }

    pub fn registry(&self) -> &QuestionTypeRegistry {
        &self.registry
    }

    fn bundle(&self, question: &GeneratedQuestion) -> Option<&HandlerBundle> {
        match self.registry.get_bundle(question.question_type) {
            Ok(bundle) => Some(bundle),
            Err(e) => {
                tracing::warn!(
                    question_id = %question.id,
                    question_type = %e.question_type(),
                    "no handler bundle, using fallback"
                );
                None
            }
        }
    }

    /// Whether `response` has the shape the question's type expects.
    /// Always false for an unregistered type.
    pub fn validate(&self, question: &GeneratedQuestion, response: &Value) -> bool {
        self.bundle(question)
            .is_some_and(|bundle| bundle.validator.validate(response))
    }

    /// Grade a live submission.
    ///
    /// A response that fails validation never reaches the scorer; it gets the
    /// type's "no answer" evaluation instead.
    pub fn calculate_score(
        &self,
        question: &GeneratedQuestion,
        response: &Value,
    ) -> QuestionEvaluationResult {
        let Some(bundle) = self.bundle(question) else {
            return unsupported_evaluation(question);
        };
        if bundle.validator.validate(response) {
            bundle.scorer.score(question, response)
        } else {
            tracing::debug!(question_id = %question.id, "response failed validation");
            bundle.scorer.unanswered(question)
        }
    }

    /// Re-grade a persisted raw payload without validating it first, so the
    /// scorer's own normalization can recover older response shapes.
    pub fn rescore(&self, question: &GeneratedQuestion, raw: &Value) -> QuestionEvaluationResult {
        match self.bundle(question) {
            Some(bundle) if raw.is_null() => bundle.scorer.unanswered(question),
            Some(bundle) => bundle.scorer.score(question, raw),
            None => unsupported_evaluation(question),
        }
    }

    pub fn present(&self, question: &GeneratedQuestion) -> Presentation {
        match self.registry.get_enabled_bundle(question.question_type) {
            Ok(bundle) => Presentation::Ready {
                prompt: bundle.presentation.render(question),
                input_hint: bundle.presentation.input_hint(question),
            },
            Err(e @ RegistryError::Unregistered(question_type)) => Presentation::Unsupported {
                question_type,
                message: e.to_string(),
            },
            Err(e @ RegistryError::Disabled(question_type)) => Presentation::Disabled {
                question_type,
                message: e.to_string(),
            },
        }
    }

    pub fn format_user_answer(&self, question: &GeneratedQuestion, response: &Value) -> String {
        match self.bundle(question) {
            Some(bundle) => bundle.formatter.format_user_answer(question, response),
            None => self.fallback.format_user_answer(response),
        }
    }

    pub fn format_correct_answer(
        &self,
        question: &GeneratedQuestion,
        evaluation: &QuestionEvaluationResult,
    ) -> String {
        match self.bundle(question) {
            Some(bundle) => bundle.formatter.format_correct_answer(question),
            None => self.fallback.format_correct_answer(evaluation),
        }
    }

    pub fn format_explanation(
        &self,
        question: &GeneratedQuestion,
        evaluation: &QuestionEvaluationResult,
    ) -> String {
        match self.bundle(question) {
            Some(bundle) => bundle.formatter.format_explanation(question, evaluation),
            None => self.fallback.format_explanation(question, evaluation),
        }
    }

    /// The persistence record for a response. Types without a structured
    /// formatter get the fallback record.
    pub fn structured_answer(
        &self,
        question: &GeneratedQuestion,
        response: &Value,
        evaluation: &QuestionEvaluationResult,
    ) -> StructuredAnswer {
        self.bundle(question)
            .and_then(|bundle| {
                bundle
                    .formatter
                    .structured_user_answer(question, response, evaluation)
            })
            .unwrap_or_else(|| self.fallback.structured_answer(question, response, evaluation))
    }

    pub fn structured_correct_answer(
        &self,
        question: &GeneratedQuestion,
    ) -> Option<StructuredAnswer> {
        self.bundle(question)?
            .formatter
            .structured_correct_answer(question)
    }

    /// Grade every question in a set against a response sheet.
    ///
    /// Questions with no response in the sheet are graded as unanswered.
    pub fn grade(&self, set: &QuestionSet, responses: &ResponseSheet) -> QuizReport {
        let answers: Vec<GradedAnswer> = set
            .questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let response = responses
                    .get(index)
                    .cloned()
                    .map(auto_migrate_response)
                    .unwrap_or(Value::Null);
                self.grade_question(index, question, response)
            })
            .collect();

        let summary = compute_summary(&answers);
        tracing::debug!(
            quiz = %set.id,
            questions = answers.len(),
            total_score = summary.total_score,
            "graded quiz"
        );

        QuizReport {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            quiz: QuizSummary {
                id: set.id.clone(),
                name: set.name.clone(),
                question_count: set.questions.len(),
            },
            answers,
            summary,
        }
    }

    fn grade_question(
        &self,
        index: usize,
        question: &GeneratedQuestion,
        response: Value,
    ) -> GradedAnswer {
        let Some(bundle) = self.bundle(question) else {
            let evaluation = unsupported_evaluation(question);
            return GradedAnswer {
                index,
                question_id: question.id.clone(),
                question_type: question.question_type,
                status: AnswerStatus::Unsupported,
                user_answer: self.fallback.format_user_answer(&response),
                correct_answer: self.fallback.format_correct_answer(&evaluation),
                explanation: self.fallback.format_explanation(question, &evaluation),
                structured: Some(self.fallback.structured_answer(question, &response, &evaluation)),
                evaluation,
            };
        };

        let (status, evaluation) = if bundle.validator.validate(&response) {
            (AnswerStatus::Graded, bundle.scorer.score(question, &response))
        } else {
            (AnswerStatus::Unanswered, bundle.scorer.unanswered(question))
        };

        // An unanswered record displays and counts as no answer; only `raw`
        // keeps the rejected payload.
        let no_answer = Value::Null;
        let shown = match status {
            AnswerStatus::Graded => &response,
            _ => &no_answer,
        };
        let formatter = &bundle.formatter;
        let mut structured = formatter
            .structured_user_answer(question, shown, &evaluation)
            .unwrap_or_else(|| self.fallback.structured_answer(question, shown, &evaluation));
        structured.raw = response.clone();

        GradedAnswer {
            index,
            question_id: question.id.clone(),
            question_type: question.question_type,
            status,
            user_answer: formatter.format_user_answer(question, shown),
            correct_answer: formatter.format_correct_answer(question),
            explanation: formatter.format_explanation(question, &evaluation),
            structured: Some(structured),
            evaluation,
        }
    }

    pub fn all_types(&self) -> Vec<QuestionType> {
        self.registry.all_types()
    }

    pub fn enabled_types(&self) -> Vec<QuestionType> {
        self.registry.enabled_types()
    }

    pub fn production_types(&self) -> Vec<QuestionType> {
        self.registry.production_types()
    }

    pub fn status(&self) -> Vec<TypeStatus> {
        self.registry.status()
    }
}

impl Default for QuizEngine {
    fn default() -> Self {
        Self::with_builtin_types()
    }
}

/// Zero-credit evaluation for a question whose type has no handler.
pub fn unsupported_evaluation(question: &GeneratedQuestion) -> QuestionEvaluationResult {
    QuestionEvaluationResult::new(question.question_type, 0.0).with_feedback(format!(
        "Question type \"{}\" is not supported yet.",
        question.question_type
    ))
}
