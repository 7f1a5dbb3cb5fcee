//! Question type registry.
//!
//! Maps a [`QuestionType`] tag to its [`HandlerBundle`]. The registry is an
//! owned value: build it once at startup (usually via
//! [`QuestionTypeRegistry::with_builtin_types`]), then share it read-only
//! behind an `Arc`. Mutation needs `&mut`, so registrations cannot race with
//! lookups.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::model::QuestionType;
use crate::traits::HandlerBundle;

/// Registration state of one tag, for admin and debug surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStatus {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// `None` when the tag has no bundle.
    pub display_name: Option<String>,
    /// A handler bundle exists for the tag.
    pub registered: bool,
    /// In the user-facing enabled set. False when unregistered.
    pub enabled: bool,
    /// Cleared for production traffic. False when unregistered.
    pub production_ready: bool,
    /// Scores can fall strictly between 0 and 1.
    pub supports_partial_credit: bool,
}

/// Tag-to-bundle lookup table.
#[derive(Debug, Default)]
pub struct QuestionTypeRegistry {
    bundles: HashMap<QuestionType, HandlerBundle>,
}

impl QuestionTypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in question type registered.
    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        crate::types::register_builtin_types(&mut registry);
        registry
    }

    /// Register a bundle, replacing (never merging with) any previous one.
    ///
    /// Returns the replaced bundle.
    pub fn register(
        &mut self,
        question_type: QuestionType,
        bundle: HandlerBundle,
    ) -> Option<HandlerBundle> {
        tracing::debug!(
            question_type = %question_type,
            enabled = bundle.enabled,
            production_ready = bundle.production_ready,
            "registering question type"
        );
        let previous = self.bundles.insert(question_type, bundle);
        if previous.is_some() {
            tracing::debug!(question_type = %question_type, "replaced existing handler bundle");
        }
        previous
    }

    /// Drop every registration.
    pub fn reset(&mut self) {
        self.bundles.clear();
    }

    /// Look up the bundle for a tag.
    pub fn get_bundle(&self, question_type: QuestionType) -> Result<&HandlerBundle, RegistryError> {
        self.bundles
            .get(&question_type)
            .ok_or(RegistryError::Unregistered(question_type))
    }

    /// Look up the bundle for a tag, treating a disabled type as an error.
    pub fn get_enabled_bundle(
        &self,
        question_type: QuestionType,
    ) -> Result<&HandlerBundle, RegistryError> {
        let bundle = self.get_bundle(question_type)?;
        if bundle.enabled {
            Ok(bundle)
        } else {
            Err(RegistryError::Disabled(question_type))
        }
    }

    pub fn is_registered(&self, question_type: QuestionType) -> bool {
        self.bundles.contains_key(&question_type)
    }

    pub fn is_enabled(&self, question_type: QuestionType) -> bool {
        self.bundles
            .get(&question_type)
            .is_some_and(|bundle| bundle.enabled)
    }

    pub fn is_production_ready(&self, question_type: QuestionType) -> bool {
        self.bundles
            .get(&question_type)
            .is_some_and(|bundle| bundle.production_ready)
    }

    pub fn set_enabled(
        &mut self,
        question_type: QuestionType,
        enabled: bool,
    ) -> Result<(), RegistryError> {
        let bundle = self
            .bundles
            .get_mut(&question_type)
            .ok_or(RegistryError::Unregistered(question_type))?;
        bundle.enabled = enabled;
        tracing::debug!(question_type = %question_type, enabled, "updated enabled flag");
        Ok(())
    }

    pub fn set_production_ready(
        &mut self,
        question_type: QuestionType,
        production_ready: bool,
    ) -> Result<(), RegistryError> {
        let bundle = self
            .bundles
            .get_mut(&question_type)
            .ok_or(RegistryError::Unregistered(question_type))?;
        bundle.production_ready = production_ready;
        tracing::debug!(
            question_type = %question_type,
            production_ready,
            "updated production flag"
        );
        Ok(())
    }

    /// Every registered tag, in [`QuestionType::ALL`] order.
    pub fn all_types(&self) -> Vec<QuestionType> {
        self.filtered(|_| true)
    }

    /// Registered tags that are enabled.
    pub fn enabled_types(&self) -> Vec<QuestionType> {
        self.filtered(|bundle| bundle.enabled)
    }

    /// Registered tags that are both enabled and production ready.
    pub fn production_types(&self) -> Vec<QuestionType> {
        self.filtered(|bundle| bundle.enabled && bundle.production_ready)
    }

    /// One status row per known tag, registered or not.
    pub fn status(&self) -> Vec<TypeStatus> {
        QuestionType::ALL
            .iter()
            .map(|&question_type| match self.bundles.get(&question_type) {
                Some(bundle) => TypeStatus {
                    question_type,
                    display_name: Some(bundle.metadata.display_name.clone()),
                    registered: true,
                    enabled: bundle.enabled,
                    production_ready: bundle.production_ready,
                    supports_partial_credit: bundle.metadata.supports_partial_credit,
                },
                None => TypeStatus {
                    question_type,
                    display_name: None,
                    registered: false,
                    enabled: false,
                    production_ready: false,
                    supports_partial_credit: false,
                },
            })
            .collect()
    }

    fn filtered(&self, keep: impl Fn(&HandlerBundle) -> bool) -> Vec<QuestionType> {
        QuestionType::ALL
            .iter()
            .copied()
            .filter(|t| self.bundles.get(t).is_some_and(&keep))
            .collect()
    }
}
