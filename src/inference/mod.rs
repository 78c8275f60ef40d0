//! Grounded question answering against an on-device language model
//!
//! Every question opens a fresh session seeded with the CSV context; sessions
//! are never reused across turns.

mod local;

use std::sync::Arc;

use async_trait::async_trait;

pub use local::{LocalModel, LocalSession};

use crate::config::AssistantConfig;
use crate::context::CsvContext;
use crate::prompt::build_system_prompt;
use crate::{Error, Result};

/// A local language model runtime
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Whether the runtime is present and answering
    async fn is_available(&self) -> bool;

    /// Open a session seeded with a system instruction
    ///
    /// # Errors
    ///
    /// Returns error if the runtime refuses the session
    async fn create_session(&self, system_prompt: &str) -> Result<Box<dyn ModelSession>>;
}

/// One request/response unit against the model
#[async_trait]
pub trait ModelSession: Send {
    /// Send one prompt and wait for the complete answer
    ///
    /// # Errors
    ///
    /// Returns error if the model fails to answer
    async fn prompt(&mut self, input: &str) -> Result<String>;
}

/// Builds grounded prompts and runs them through a [`LanguageModel`]
pub struct InferenceClient {
    model: Arc<dyn LanguageModel>,
    assistant: AssistantConfig,
}

impl InferenceClient {
    /// Create a client for the given model and prompt framing
    #[must_use]
    pub fn new(model: Arc<dyn LanguageModel>, assistant: AssistantConfig) -> Self {
        Self { model, assistant }
    }

    /// Fail fast when the runtime is absent
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelUnavailable`] if the runtime does not answer
    pub async fn check_available(&self) -> Result<()> {
        if self.model.is_available().await {
            Ok(())
        } else {
            tracing::warn!("on-device model not available");
            Err(Error::ModelUnavailable)
        }
    }

    /// Answer a question using only the loaded CSV, in a fresh session
    ///
    /// `language` is the display name the answer must be written in.
    ///
    /// # Errors
    ///
    /// Returns the session creation or prompt error
    pub async fn answer(
        &self,
        query: &str,
        context: &CsvContext,
        language: &str,
    ) -> Result<String> {
        let system_prompt = build_system_prompt(&self.assistant, context.as_text(), language);
        tracing::debug!(
            language,
            prompt_chars = system_prompt.len(),
            rows = context.rows().len(),
            "creating inference session"
        );

        let mut session = self.model.create_session(&system_prompt).await?;
        let answer = session.prompt(query).await?;

        tracing::info!(answer_chars = answer.len(), "inference complete");
        Ok(answer)
    }
}
