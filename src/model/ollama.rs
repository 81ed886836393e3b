//! Ollama backend for local models.
//!
//! Talks to the Ollama HTTP API at `OLLAMA_HOST` (default
//! `http://localhost:11434`). Response decoding is deliberately lenient:
//! depending on version and model, Ollama answers with chat-style JSON, a
//! `response`/`text` field, or plain text. Whatever comes back is normalised
//! to a [`ModelRaw`] — a structured message when a content field is found,
//! bare text otherwise.

use crate::config::WorkflowConfig;
use crate::error::DocuflowError;
use crate::state::ChatMessage;
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::{ModelClient, ModelMessage, ModelRaw};

const DEFAULT_HOST: &str = "http://localhost:11434";

/// [`ModelClient`] backed by a local Ollama instance.
pub struct OllamaClient {
    http: reqwest::Client,
    host: String,
    model: String,
}

impl OllamaClient {
    /// Build from the environment: model from config / `DOCUFLOW_MODEL` /
    /// `OLLAMA_MODEL` (required), host from `OLLAMA_HOST`.
    pub fn from_env(config: &WorkflowConfig) -> Result<Self, DocuflowError> {
        let model = config
            .model
            .clone()
            .or_else(|| std::env::var("DOCUFLOW_MODEL").ok().filter(|m| !m.is_empty()))
            .or_else(|| std::env::var("OLLAMA_MODEL").ok().filter(|m| !m.is_empty()))
            .ok_or_else(|| DocuflowError::BackendNotConfigured {
                hint: "The ollama backend needs a model name (OLLAMA_MODEL or --model).".into(),
            })?;

        let host = std::env::var("OLLAMA_HOST")
            .ok()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| DocuflowError::Internal(format!("http client: {e}")))?;

        Ok(Self { http, host, model })
    }

    /// Normalise whatever an Ollama version hands back into a [`ModelRaw`].
    fn decode(text: String) -> ModelRaw {
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(payload) => {
                if let Some(content) = payload["choices"][0]["message"]["content"].as_str() {
                    return ModelRaw::Message(ModelMessage {
                        content: content.to_string(),
                        tasks: None,
                    });
                }
                if let Some(content) = payload["response"].as_str() {
                    return ModelRaw::Message(ModelMessage {
                        content: content.to_string(),
                        tasks: None,
                    });
                }
                if let Some(content) = payload["text"].as_str() {
                    return ModelRaw::Message(ModelMessage {
                        content: content.to_string(),
                        tasks: None,
                    });
                }
                // Unrecognised JSON shape: hand the raw document to the
                // parsers, which degrade safely.
                ModelRaw::Text(payload.to_string())
            }
            Err(_) => ModelRaw::Text(text),
        }
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<ModelRaw, DocuflowError> {
        let url = format!("{}/api/generate", self.host);
        let body = json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
        });

        debug!("ollama: {} messages → {} @ {}", messages.len(), self.model, self.host);

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DocuflowError::ModelApi {
                message: format!("ollama request: {e}"),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| DocuflowError::ModelApi {
            message: format!("ollama response read: {e}"),
        })?;

        if !status.is_success() {
            return Err(DocuflowError::ModelApi {
                message: format!("ollama {status}: {text}"),
            });
        }

        Ok(Self::decode(text))
    }
}
