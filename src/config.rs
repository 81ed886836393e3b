//! Configuration for workflow runs.
//!
//! Every knob lives in [`WorkflowConfig`], built via its
//! [`WorkflowConfigBuilder`]. Keeping the knobs in one struct makes configs
//! trivial to share across runs and to diff when two runs behave
//! differently.
//!
//! # Design choice: builder over constructor
//! Callers set only what they care about and rely on documented defaults for
//! the rest; adding a field later does not break existing call sites.

use crate::error::DocuflowError;
use crate::model::ModelClient;
use std::fmt;
use std::sync::Arc;

/// Configuration for a workflow run.
///
/// # Example
/// ```rust
/// use docuflow::WorkflowConfig;
///
/// let config = WorkflowConfig::builder()
///     .backend("mock")
///     .max_steps(10)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct WorkflowConfig {
    /// Pre-constructed model client. Takes precedence over `backend`.
    pub client: Option<Arc<dyn ModelClient>>,

    /// Model backend name: "mock", "openai", or "ollama".
    /// If `None` along with `client`, the backend is resolved from the
    /// environment (see [`crate::model::resolve_client`]).
    pub backend: Option<String>,

    /// Model identifier passed to the backend (e.g. "gpt-4o-mini").
    /// If `None`, the backend's own default applies.
    pub model: Option<String>,

    /// Custom planner system prompt. If `None`, the built-in default.
    pub plan_prompt: Option<String>,

    /// Custom extractor system prompt. If `None`, the built-in default.
    pub extract_prompt: Option<String>,

    /// Ceiling on graph node executions per run. Default: 25.
    ///
    /// The shipped workflow graph terminates by construction; the ceiling is
    /// a safety net for caller-built graphs that accidentally cycle.
    pub max_steps: usize,

    /// Per-model-call HTTP timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            client: None,
            backend: None,
            model: None,
            plan_prompt: None,
            extract_prompt: None,
            max_steps: 25,
            api_timeout_secs: 60,
        }
    }
}

impl fmt::Debug for WorkflowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowConfig")
            .field("client", &self.client.as_ref().map(|_| "<dyn ModelClient>"))
            .field("backend", &self.backend)
            .field("model", &self.model)
            .field("plan_prompt", &self.plan_prompt.as_ref().map(|_| "<custom>"))
            .field(
                "extract_prompt",
                &self.extract_prompt.as_ref().map(|_| "<custom>"),
            )
            .field("max_steps", &self.max_steps)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl WorkflowConfig {
    /// Create a new builder for `WorkflowConfig`.
    pub fn builder() -> WorkflowConfigBuilder {
        WorkflowConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`WorkflowConfig`].
#[derive(Debug)]
pub struct WorkflowConfigBuilder {
    config: WorkflowConfig,
}

impl WorkflowConfigBuilder {
    pub fn client(mut self, client: Arc<dyn ModelClient>) -> Self {
        self.config.client = Some(client);
        self
    }

    pub fn backend(mut self, name: impl Into<String>) -> Self {
        self.config.backend = Some(name.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn plan_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.plan_prompt = Some(prompt.into());
        self
    }

    pub fn extract_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.extract_prompt = Some(prompt.into());
        self
    }

    pub fn max_steps(mut self, n: usize) -> Self {
        self.config.max_steps = n.max(1);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<WorkflowConfig, DocuflowError> {
        let c = &self.config;
        if let Some(ref name) = c.backend {
            if !matches!(name.as_str(), "mock" | "openai" | "ollama") {
                return Err(DocuflowError::UnknownBackend { name: name.clone() });
            }
        }
        Ok(self.config)
    }
}
