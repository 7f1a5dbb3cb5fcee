//! quizforge-core: question type registry and evaluation engine.
//!
//! This crate defines the tagged question/response model, the handler
//! contract every question type implements, the registry that routes by tag,
//! and the engine facade that validates, scores and formats answers without
//! the caller ever branching on question type.

pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod migration;
pub mod model;
pub mod parser;
pub mod registry;
pub mod report;
pub mod statistics;
pub mod traits;
pub mod types;

pub use engine::{Presentation, QuizEngine};
pub use error::{MigrationError, RegistryError};
pub use model::{GeneratedQuestion, QuestionEvaluationResult, QuestionType, StructuredAnswer};
pub use registry::QuestionTypeRegistry;
