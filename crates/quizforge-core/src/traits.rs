//! Handler contract for question types.
//!
//! Each question type supplies a validator, a scorer, a result formatter and
//! a presentation handler. The registry stores them together as a
//! [`HandlerBundle`] keyed by [`QuestionType`], so quiz flow, scoring and
//! persistence code never branch on the tag themselves.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{GeneratedQuestion, QuestionEvaluationResult, StructuredAnswer};

/// Feedback used when a response is missing or fails validation.
pub const NO_ANSWER_FEEDBACK: &str = "No answer provided.";

// ---------------------------------------------------------------------------
// Handler traits
// ---------------------------------------------------------------------------

/// Checks that a raw response has the shape its question type expects.
///
/// Implementations are strict about missing required fields and tolerant of
/// extra ones.
pub trait ResponseValidator: Send + Sync {
    fn validate(&self, response: &Value) -> bool;
}

/// Grades a response against its question.
///
/// Scoring is a pure function of its inputs and never fails: malformed input
/// grades as zero (or partial) credit.
pub trait Scorer: Send + Sync {
    fn score(&self, question: &GeneratedQuestion, response: &Value) -> QuestionEvaluationResult;

    /// The evaluation given when there is no usable response at all.
    fn unanswered(&self, question: &GeneratedQuestion) -> QuestionEvaluationResult {
        QuestionEvaluationResult::new(question.question_type, 0.0).with_feedback(NO_ANSWER_FEEDBACK)
    }
}

/// Turns question/response/evaluation triples into display strings and
/// persistence records.
pub trait ResultFormatter: Send + Sync {
    fn format_user_answer(&self, question: &GeneratedQuestion, response: &Value) -> String;

    fn format_correct_answer(&self, question: &GeneratedQuestion) -> String;

    fn format_explanation(
        &self,
        question: &GeneratedQuestion,
        evaluation: &QuestionEvaluationResult,
    ) -> String {
        crate::format::explanation_text(question, evaluation)
    }

    fn structured_user_answer(
        &self,
        _question: &GeneratedQuestion,
        _response: &Value,
        _evaluation: &QuestionEvaluationResult,
    ) -> Option<StructuredAnswer> {
        None
    }

    fn structured_correct_answer(&self, _question: &GeneratedQuestion) -> Option<StructuredAnswer> {
        None
    }
}

/// Minimal rendering contract: a plain-text prompt plus an input hint.
pub trait PresentationHandler: Send + Sync {
    fn render(&self, question: &GeneratedQuestion) -> String;

    fn input_hint(&self, question: &GeneratedQuestion) -> String;
}

// ---------------------------------------------------------------------------
// Handler bundle
// ---------------------------------------------------------------------------

/// Descriptive metadata for a question type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMetadata {
    /// Human-readable name (e.g. "Multiple Choice").
    pub display_name: String,
    /// One-line summary for admin listings.
    pub description: String,
    /// Scores can fall strictly between 0 and 1.
    pub supports_partial_credit: bool,
}

impl TypeMetadata {
    pub fn new(display_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            description: description.into(),
            supports_partial_credit: false,
        }
    }

    pub fn with_partial_credit(mut self) -> Self {
        self.supports_partial_credit = true;
        self
    }
}

/// Everything registered for one question type.
///
/// A bundle is always complete; re-registering a tag replaces the whole bundle.
#[derive(Clone)]
pub struct HandlerBundle {
    pub metadata: TypeMetadata,
    /// Gate in front of the scorer.
    pub validator: Arc<dyn ResponseValidator>,
    pub scorer: Arc<dyn Scorer>,
    pub formatter: Arc<dyn ResultFormatter>,
    pub presentation: Arc<dyn PresentationHandler>,
    /// Included in the user-facing enabled set.
    pub enabled: bool,
    /// Cleared for production traffic.
    pub production_ready: bool,
}

impl HandlerBundle {
    /// A bundle from separate handlers. Enabled, not yet production ready.
    pub fn new(
        metadata: TypeMetadata,
        validator: Arc<dyn ResponseValidator>,
        scorer: Arc<dyn Scorer>,
        formatter: Arc<dyn ResultFormatter>,
        presentation: Arc<dyn PresentationHandler>,
    ) -> Self {
        Self {
            metadata,
            validator,
            scorer,
            formatter,
            presentation,
            enabled: true,
            production_ready: false,
        }
    }

    /// A bundle from one value implementing every handler trait.
    pub fn from_handler<H>(metadata: TypeMetadata, handler: H) -> Self
    where
        H: ResponseValidator + Scorer + ResultFormatter + PresentationHandler + 'static,
    {
        let handler = Arc::new(handler);
        Self::new(
            metadata,
            handler.clone(),
            handler.clone(),
            handler.clone(),
            handler,
        )
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_production_ready(mut self, production_ready: bool) -> Self {
        self.production_ready = production_ready;
        self
    }
}

impl fmt::Debug for HandlerBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerBundle")
            .field("metadata", &self.metadata)
            .field("enabled", &self.enabled)
            .field("production_ready", &self.production_ready)
            .finish_non_exhaustive()
    }
}
