//! Model backends: the single seam through which agents reach a language
//! model.
//!
//! The core calls exactly one method — [`ModelClient::invoke`] — and treats
//! everything behind it as an external collaborator. Backends differ in what
//! they hand back: chat APIs return a structured message, while bare
//! completion endpoints return plain text. [`ModelRaw`] carries both shapes
//! so parsers can apply the right degradation path for each.

use crate::error::DocuflowError;
use crate::state::{ChatMessage, Task};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

mod mock;
mod ollama;
mod openai;

pub use mock::MockClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

/// A structured chat response from a model backend.
///
/// `tasks` is populated only by backends whose API contract returns a
/// pre-parsed task list alongside the text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMessage {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
}

/// Raw payload returned by a model backend, before parsing.
#[derive(Debug, Clone)]
pub enum ModelRaw {
    /// A bare text completion.
    Text(String),
    /// A structured chat message.
    Message(ModelMessage),
}

/// A language-model backend.
///
/// Implementations must be safe to call repeatedly within a run; failures
/// surface as errors, never as degraded responses (degradation is the
/// parsers' job, and only for *malformed* output, not failed calls).
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<ModelRaw, DocuflowError>;
}

/// Resolve the model client for a run, from most-specific to least-specific.
///
/// 1. **Pre-built client** (`config.client`) — used as-is. The route for
///    tests and callers wrapping a client in their own middleware.
/// 2. **Named backend** (`config.backend`) — "mock", "openai", or "ollama",
///    constructed from config plus environment.
/// 3. **Environment pair** (`DOCUFLOW_BACKEND`, optionally `DOCUFLOW_MODEL`)
///    — a deployment-level choice (Makefile, CI) honoured before any
///    auto-detection.
/// 4. **`USE_MOCK=true`** — the offline development switch.
/// 5. **Auto-detection** — `OPENAI_API_KEY` present → OpenAI; else
///    `OLLAMA_MODEL` present → Ollama; else a configuration error with a
///    setup hint.
pub fn resolve_client(
    config: &crate::config::WorkflowConfig,
) -> Result<Arc<dyn ModelClient>, DocuflowError> {
    if let Some(ref client) = config.client {
        return Ok(Arc::clone(client));
    }

    if let Some(ref name) = config.backend {
        return build_backend(name, config);
    }

    if let Ok(name) = std::env::var("DOCUFLOW_BACKEND") {
        if !name.is_empty() {
            return build_backend(&name, config);
        }
    }

    if std::env::var("USE_MOCK").is_ok_and(|v| v.eq_ignore_ascii_case("true")) {
        debug!("USE_MOCK=true — using the mock model backend");
        return Ok(Arc::new(MockClient::new()));
    }

    if std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty()) {
        return Ok(Arc::new(OpenAiClient::from_env(config)?));
    }

    if std::env::var("OLLAMA_MODEL").is_ok_and(|m| !m.is_empty()) {
        return Ok(Arc::new(OllamaClient::from_env(config)?));
    }

    Err(DocuflowError::BackendNotConfigured {
        hint: "Set OPENAI_API_KEY for OpenAI, OLLAMA_MODEL for a local Ollama model,\n\
               or USE_MOCK=true for the offline mock backend."
            .into(),
    })
}

fn build_backend(
    name: &str,
    config: &crate::config::WorkflowConfig,
) -> Result<Arc<dyn ModelClient>, DocuflowError> {
    match name {
        "mock" => Ok(Arc::new(MockClient::new())),
        "openai" => Ok(Arc::new(OpenAiClient::from_env(config)?)),
        "ollama" => Ok(Arc::new(OllamaClient::from_env(config)?)),
        other => Err(DocuflowError::UnknownBackend {
            name: other.to_string(),
        }),
    }
}
