//! OpenAI-compatible local runtime (Ollama, llama.cpp server, LM Studio)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::inference::{LanguageModel, ModelSession};
use crate::{Error, Result};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Language model served by a runtime on this machine
pub struct LocalModel {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl LocalModel {
    /// Create a client for the configured runtime
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl LanguageModel for LocalModel {
    async fn is_available(&self) -> bool {
        let url = format!("{}/models", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::debug!(status = %response.status(), url = %url, "model runtime refused probe");
                false
            }
            Err(e) => {
                tracing::debug!(error = %e, url = %url, "model runtime unreachable");
                false
            }
        }
    }

    async fn create_session(&self, system_prompt: &str) -> Result<Box<dyn ModelSession>> {
        Ok(Box::new(LocalSession {
            client: self.client.clone(),
            url: format!("{}/chat/completions", self.base_url),
            model: self.model.clone(),
            system_prompt: system_prompt.to_string(),
        }))
    }
}

/// A single-question session against a [`LocalModel`]
pub struct LocalSession {
    client: reqwest::Client,
    url: String,
    model: String,
    system_prompt: String,
}

#[async_trait]
impl ModelSession for LocalSession {
    async fn prompt(&mut self, input: &str) -> Result<String> {
        tracing::debug!(model = %self.model, chars = input.len(), "prompting local model");

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: input,
                },
            ],
            stream: false,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!("model error {status}: {body}")));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(e.to_string()))?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Inference("model returned no answer".to_string()))
    }
}
