//! OpenAI chat-completions backend.
//!
//! A deliberately small client: one `POST /chat/completions` per invocation,
//! no retries (the core's contract is exactly one external call per agent
//! invocation; retry policy belongs to the operator's gateway if they want
//! one).

use crate::config::WorkflowConfig;
use crate::error::DocuflowError;
use crate::state::ChatMessage;
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::{ModelClient, ModelMessage, ModelRaw};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// [`ModelClient`] backed by the OpenAI chat-completions API.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    /// Build from the environment: `OPENAI_API_KEY` (required),
    /// `OPENAI_MODEL` / config model (optional), `OPENAI_BASE_URL` to point
    /// at an OpenAI-compatible endpoint.
    pub fn from_env(config: &WorkflowConfig) -> Result<Self, DocuflowError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| DocuflowError::BackendNotConfigured {
                hint: "The openai backend needs OPENAI_API_KEY set.".into(),
            })?;

        let model = config
            .model
            .clone()
            .or_else(|| std::env::var("DOCUFLOW_MODEL").ok().filter(|m| !m.is_empty()))
            .or_else(|| std::env::var("OPENAI_MODEL").ok().filter(|m| !m.is_empty()))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base_url = std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| DocuflowError::Internal(format!("http client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            model,
            base_url,
        })
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<ModelRaw, DocuflowError> {
        let body = json!({
            "model": self.model,
            "messages": messages,
        });

        debug!("openai: {} messages → {}", messages.len(), self.model);

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DocuflowError::ModelApi {
                message: format!("openai request: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DocuflowError::ModelApi {
                message: format!("openai {status}: {text}"),
            });
        }

        let payload: serde_json::Value =
            response.json().await.map_err(|e| DocuflowError::ModelApi {
                message: format!("openai response decode: {e}"),
            })?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();

        Ok(ModelRaw::Message(ModelMessage {
            content,
            tasks: None,
        }))
    }
}
