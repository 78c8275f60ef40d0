//! Configuration management for the sales assistant

pub mod file;

use std::time::Duration;

use crate::context::DEFAULT_CONTEXT_ROWS;
use crate::persona::PersonaKind;
use crate::{Error, Result};

use self::file::AssistantConfigFile;

/// Sales assistant configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Answer language display name
    pub language: String,

    /// Voice persona
    pub persona: PersonaKind,

    /// Rows of the CSV kept for the prompt
    pub context_rows: usize,

    /// Prompt framing
    pub assistant: AssistantConfig,

    /// Local model runtime
    pub model: ModelConfig,

    /// Speech output
    pub speech: SpeechConfig,
}

/// Prompt framing and user-facing copy
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Role the model plays
    pub name: String,

    /// Product line named in the ready message
    pub product_line: String,

    /// Who the answers are pitched at
    pub audience: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: "TAFE Sales Assistant".to_string(),
            product_line: "Massey Ferguson".to_string(),
            audience: "a farmer".to_string(),
        }
    }
}

/// Local model runtime configuration
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// OpenAI-compatible base URL
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            model: "gemma3:1b".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Speech output configuration
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// Speak answers aloud
    pub enabled: bool,

    /// Synthesizer binary; `None` searches PATH for espeak-ng
    pub synthesizer: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            synthesizer: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "English".to_string(),
            persona: PersonaKind::default(),
            context_rows: DEFAULT_CONTEXT_ROWS,
            assistant: AssistantConfig::default(),
            model: ModelConfig::default(),
            speech: SpeechConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the standard config file and environment
    ///
    /// # Errors
    ///
    /// Returns error if the resulting configuration is invalid
    pub fn load() -> Result<Self> {
        Self::from_file_config(file::load_config_file())
    }

    /// Resolve configuration (env > toml > default)
    ///
    /// # Errors
    ///
    /// Returns error if the resulting configuration is invalid
    pub fn from_file_config(fc: AssistantConfigFile) -> Result<Self> {
        let defaults = Self::default();

        let language = std::env::var("SALES_ASSISTANT_LANGUAGE")
            .ok()
            .or(fc.language)
            .unwrap_or(defaults.language);

        let persona = std::env::var("SALES_ASSISTANT_PERSONA")
            .ok()
            .or(fc.persona)
            .map_or(defaults.persona, PersonaKind::from);

        let context_rows = fc.context_rows.unwrap_or(defaults.context_rows);

        let assistant = AssistantConfig {
            name: fc.assistant.name.unwrap_or(defaults.assistant.name),
            product_line: fc
                .assistant
                .product_line
                .unwrap_or(defaults.assistant.product_line),
            audience: fc.assistant.audience.unwrap_or(defaults.assistant.audience),
        };

        let model = ModelConfig {
            base_url: std::env::var("SALES_ASSISTANT_MODEL_URL")
                .ok()
                .or(fc.model.base_url)
                .unwrap_or(defaults.model.base_url),
            model: std::env::var("SALES_ASSISTANT_MODEL")
                .ok()
                .or(fc.model.model)
                .unwrap_or(defaults.model.model),
            timeout: fc
                .model
                .timeout_secs
                .map_or(defaults.model.timeout, Duration::from_secs),
        };

        let speech = SpeechConfig {
            enabled: fc.speech.enabled.unwrap_or(defaults.speech.enabled),
            synthesizer: std::env::var("SALES_ASSISTANT_SYNTHESIZER")
                .ok()
                .or(fc.speech.synthesizer),
        };

        let config = Self {
            language,
            persona,
            context_rows,
            assistant,
            model,
            speech,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the rest of the crate relies on
    ///
    /// # Errors
    ///
    /// Returns error if a value is out of range
    pub fn validate(&self) -> Result<()> {
        if self.context_rows == 0 {
            return Err(Error::Config("context_rows must be at least 1".to_string()));
        }
        if self.model.base_url.trim().is_empty() {
            return Err(Error::Config("model base_url must not be empty".to_string()));
        }
        if self.model.model.trim().is_empty() {
            return Err(Error::Config("model name must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo() {
        let config = Config::default();

        assert_eq!(config.language, "English");
        assert_eq!(config.persona, PersonaKind::MaleBaritone);
        assert_eq!(config.context_rows, 25);
        assert_eq!(config.assistant.name, "TAFE Sales Assistant");
        assert!(config.speech.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn file_values_override_defaults() {
        let fc: AssistantConfigFile = toml::from_str(
            r#"
            context_rows = 10

            [assistant]
            product_line = "Eicher"

            [speech]
            enabled = false
            "#,
        )
        .unwrap();

        let config = Config::from_file_config(fc).unwrap();

        assert_eq!(config.context_rows, 10);
        assert_eq!(config.assistant.product_line, "Eicher");
        assert_eq!(config.assistant.name, "TAFE Sales Assistant");
        assert!(!config.speech.enabled);
    }

    #[test]
    fn zero_context_rows_is_rejected() {
        let fc: AssistantConfigFile = toml::from_str("context_rows = 0").unwrap();
        assert!(matches!(
            Config::from_file_config(fc),
            Err(Error::Config(_))
        ));
    }
}
