//! Engine configuration: per-type rollout toggles.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::QuestionType;
use crate::registry::QuestionTypeRegistry;

/// Comma-separated tags forced on.
pub const ENABLED_TYPES_ENV: &str = "QUIZFORGE_ENABLED_TYPES";
/// Comma-separated tags forced off. Applied after [`ENABLED_TYPES_ENV`].
pub const DISABLED_TYPES_ENV: &str = "QUIZFORGE_DISABLED_TYPES";

/// Overrides for one question type. Unset fields keep the registered default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeToggle {
    /// Include the type in the user-facing enabled set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Clear the type for production traffic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_ready: Option<bool>,
}

/// Top-level quizforge configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Toggles keyed by question-type tag (`[types.completion]`).
    #[serde(default)]
    pub types: BTreeMap<String, TypeToggle>,
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse engine config")
    }

    /// Fold comma-separated tag lists from the environment into the toggles.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for (key, enabled) in [(ENABLED_TYPES_ENV, true), (DISABLED_TYPES_ENV, false)] {
            let Some(list) = lookup(key) else {
                continue;
            };
            for tag in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                self.types.entry(tag.to_string()).or_default().enabled = Some(enabled);
            }
        }
    }

    /// Push the toggles into a registry. Unknown or unregistered tags are
    /// logged and skipped.
    pub fn apply(&self, registry: &mut QuestionTypeRegistry) {
        for (tag, toggle) in &self.types {
            let question_type = match tag.parse::<QuestionType>() {
                Ok(question_type) => question_type,
                Err(e) => {
                    tracing::warn!("ignoring config for {tag:?}: {e}");
                    continue;
                }
            };
            if let Some(enabled) = toggle.enabled {
                if let Err(e) = registry.set_enabled(question_type, enabled) {
                    tracing::warn!("ignoring enabled toggle: {e}");
                }
            }
            if let Some(ready) = toggle.production_ready {
                if let Err(e) = registry.set_production_ready(question_type, ready) {
                    tracing::warn!("ignoring production_ready toggle: {e}");
                }
            }
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizforge.toml` in the current directory
/// 2. `~/.config/quizforge/config.toml`
///
/// Environment overrides are applied on top of whichever file was found.
pub fn load_config() -> Result<EngineConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<EngineConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("quizforge.toml");
            if local.exists() {
                Some(local)
            } else {
                config_dir()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!("loading config from {}", path.display());
            toml::from_str::<EngineConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    config.apply_env_overrides();
    Ok(config)
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizforge"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn parse_type_toggles() {
        let config = EngineConfig::from_toml_str(
            r#"
[types.completion]
enabled = false

[types.matching]
production_ready = true
"#,
        )
        .unwrap();
        assert_eq!(config.types.len(), 2);
        assert_eq!(config.types["completion"].enabled, Some(false));
        assert_eq!(config.types["completion"].production_ready, None);
        assert_eq!(config.types["matching"].production_ready, Some(true));
    }

    #[test]
    fn env_lists_override_file() {
        let env: HashMap<&str, &str> = [
            (ENABLED_TYPES_ENV, "completion, multiple-choice"),
            (DISABLED_TYPES_ENV, "multiple-choice,"),
        ]
        .into_iter()
        .collect();

        let mut config =
            EngineConfig::from_toml_str("[types.completion]\nenabled = false\n").unwrap();
        config.apply_overrides_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.types["completion"].enabled, Some(true));
        assert_eq!(config.types["multiple-choice"].enabled, Some(false));
        assert_eq!(config.types.len(), 2);
    }

    #[test]
    fn apply_toggles_registry() {
        let mut registry = QuestionTypeRegistry::with_builtin_types();
        let config = EngineConfig::from_toml_str(
            r#"
[types.fill_blank]
enabled = false

[types.multiple-choice]
production_ready = false

[types.matching]
enabled = true

[types.essay]
enabled = true
"#,
        )
        .unwrap();
        config.apply(&mut registry);

        assert!(!registry.is_enabled(QuestionType::Completion));
        assert!(registry.is_enabled(QuestionType::MultipleChoice));
        assert!(!registry.is_production_ready(QuestionType::MultipleChoice));
        assert!(!registry.is_registered(QuestionType::Matching));
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizforge.toml");
        std::fs::write(&path, "[types.completion]\nproduction_ready = false\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.types["completion"].production_ready, Some(false));
    }
}
