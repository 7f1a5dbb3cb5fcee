//! Engine error types.
//!
//! Only registry lookups and legacy downgrades produce errors callers branch
//! on. Scoring and formatting never fail; they return fallback values.

use thiserror::Error;

use crate::model::QuestionType;

/// Errors from looking up a question type's handler bundle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No handler bundle is registered for the tag.
    #[error("unsupported question type: {0}")]
    Unregistered(QuestionType),

    /// The tag is registered but administratively switched off.
    #[error("question type is disabled: {0}")]
    Disabled(QuestionType),
}

impl RegistryError {
    pub fn question_type(&self) -> QuestionType {
        match self {
            RegistryError::Unregistered(t) | RegistryError::Disabled(t) => *t,
        }
    }
}

/// Errors from converting between the legacy and tagged shapes.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// There is no legacy representation for this question type.
    #[error("legacy conversion not implemented for question type: {0}")]
    NotImplemented(QuestionType),

    /// The input matched neither the legacy nor the tagged shape.
    #[error("malformed question: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A legacy correct answer that names none of the options.
    #[error("cannot resolve legacy answer '{answer}' against {option_count} options")]
    UnresolvableAnswer { answer: String, option_count: usize },
}
