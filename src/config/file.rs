//! TOML configuration file loading
//!
//! Supports `~/.config/omni/sales-assistant/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct AssistantConfigFile {
    /// Answer language display name (e.g. "Hindi")
    pub language: Option<String>,

    /// Voice persona label (e.g. "male-bass")
    pub persona: Option<String>,

    /// Rows of the CSV kept for the prompt
    pub context_rows: Option<usize>,

    /// Prompt framing
    #[serde(default)]
    pub assistant: AssistantFileConfig,

    /// Local model runtime
    #[serde(default)]
    pub model: ModelFileConfig,

    /// Speech output
    #[serde(default)]
    pub speech: SpeechFileConfig,
}

/// Prompt framing configuration
#[derive(Debug, Default, Deserialize)]
pub struct AssistantFileConfig {
    /// Role the model plays (e.g. "TAFE Sales Assistant")
    pub name: Option<String>,

    /// Product line named in the ready message
    pub product_line: Option<String>,

    /// Who the answers are pitched at (e.g. "a farmer")
    pub audience: Option<String>,
}

/// Local model runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ModelFileConfig {
    /// OpenAI-compatible base URL (e.g. "http://localhost:11434/v1")
    pub base_url: Option<String>,

    /// Model identifier
    pub model: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Speech output configuration
#[derive(Debug, Default, Deserialize)]
pub struct SpeechFileConfig {
    /// Speak answers aloud
    pub enabled: Option<bool>,

    /// Synthesizer binary name or path
    pub synthesizer: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `AssistantConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> AssistantConfigFile {
    config_file_path().map_or_else(AssistantConfigFile::default, |path| load_from(&path))
}

/// Load a TOML config file from an explicit path
///
/// Returns `AssistantConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_from(path: &Path) -> AssistantConfigFile {
    if !path.exists() {
        return AssistantConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                AssistantConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            AssistantConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/omni/sales-assistant/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| {
        d.config_dir()
            .join("omni")
            .join("sales-assistant")
            .join("config.toml")
    })
}
