//! Error types for the docuflow library.
//!
//! One fatal error enum covers both interpreters. The variants fall into two
//! families with different origins but identical handling — both abort the
//! run and surface verbatim to the caller:
//!
//! * **Configuration** — the graph or pipeline definition itself is wrong
//!   (unknown service, duplicate step id, edge to a node that was never
//!   added). These are caller bugs and retrying cannot help.
//!
//! * **External call** — a model backend or document tool failed. The core
//!   never retries; adapters may retry internally before surfacing.
//!
//! Malformed *model output* is deliberately absent from this enum: parsers
//! degrade to a plain-content result instead of failing (see
//! [`crate::agent::parser`]). Likewise a single image failing OCR inside a
//! batch is recorded as an `"ERROR: …"` value in the result map, not raised
//! (see [`crate::services::DocumentServices::pdf_to_text`]).

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docuflow library.
#[derive(Debug, Error)]
pub enum DocuflowError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// A pipeline step names a service outside the closed registry.
    #[error("Unknown service '{name}' in step '{step}'\nKnown services: pdfToImage, pdfToText")]
    UnknownService { step: String, name: String },

    /// Two pipeline steps share an id.
    #[error("Duplicate step id '{id}' in pipeline definition")]
    DuplicateStepId { id: String },

    /// A step is missing a parameter its service requires.
    #[error("Step '{step}' is missing required param '{param}'")]
    MissingParam { step: String, param: String },

    /// The requested model backend name is not recognised.
    #[error("Unknown model backend '{name}'\nKnown backends: mock, openai, ollama")]
    UnknownBackend { name: String },

    /// No model backend could be resolved from config or environment.
    #[error("No model backend configured.\n{hint}")]
    BackendNotConfigured { hint: String },

    /// Two graph nodes were registered under the same name.
    #[error("Duplicate graph node '{name}'")]
    DuplicateNode { name: String },

    /// An edge or transition references a node that was never added.
    #[error("Graph references unknown node '{name}'")]
    UnknownNode { name: String },

    /// A conditional edge chose a target outside its declared set.
    #[error("Conditional edge from '{node}' chose undeclared target '{target}'")]
    UndeclaredTarget { node: String, target: String },

    /// A node has no outgoing edge; the executor could never leave it.
    #[error("Node '{node}' has no outgoing edge")]
    MissingEdge { node: String },

    /// A pipeline definition document failed to parse.
    #[error("Invalid pipeline definition: {0}")]
    InvalidDefinition(String),

    // ── External call errors ──────────────────────────────────────────────
    /// The model backend returned an error or unusable response.
    #[error("Model call failed: {message}")]
    ModelApi { message: String },

    /// A required command-line tool is not installed.
    #[error("'{tool}' not found on PATH. {hint}")]
    ToolNotFound { tool: String, hint: String },

    /// A document tool ran but exited unsuccessfully.
    #[error("{tool} failed: {detail}")]
    ToolFailed { tool: String, detail: String },

    /// A pipeline definition file could not be read.
    #[error("Failed to read pipeline definition '{path}': {source}")]
    DefinitionRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Safety / internal ─────────────────────────────────────────────────
    /// The graph executor hit its step ceiling without reaching END.
    ///
    /// The shipped workflow graph is acyclic and can never trip this; the
    /// ceiling exists so a caller-built graph with a cycle fails loudly
    /// instead of spinning.
    #[error("Graph did not reach END within {limit} steps (possible cycle)\nRaise the limit with WorkflowConfig::builder().max_steps(..) if the graph is legitimately deep.")]
    StepLimitExceeded { limit: usize },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocuflowError {
    /// True for errors caused by a bad graph or pipeline definition rather
    /// than by an external collaborator.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DocuflowError::UnknownService { .. }
                | DocuflowError::DuplicateStepId { .. }
                | DocuflowError::MissingParam { .. }
                | DocuflowError::UnknownBackend { .. }
                | DocuflowError::BackendNotConfigured { .. }
                | DocuflowError::DuplicateNode { .. }
                | DocuflowError::UnknownNode { .. }
                | DocuflowError::UndeclaredTarget { .. }
                | DocuflowError::MissingEdge { .. }
                | DocuflowError::InvalidDefinition(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_service_display() {
        let e = DocuflowError::UnknownService {
            step: "convert".into(),
            name: "pdfToAudio".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("pdfToAudio"), "got: {msg}");
        assert!(msg.contains("convert"));
    }

    #[test]
    fn duplicate_step_id_display() {
        let e = DocuflowError::DuplicateStepId { id: "s1".into() };
        assert!(e.to_string().contains("s1"));
    }

    #[test]
    fn step_limit_display() {
        let e = DocuflowError::StepLimitExceeded { limit: 25 };
        assert!(e.to_string().contains("25"));
    }

    #[test]
    fn tool_not_found_display() {
        let e = DocuflowError::ToolNotFound {
            tool: "pdftoppm".into(),
            hint: "Install Poppler.".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("pdftoppm"));
        assert!(msg.contains("Poppler"));
    }

    #[test]
    fn configuration_classification() {
        assert!(DocuflowError::DuplicateStepId { id: "x".into() }.is_configuration());
        assert!(DocuflowError::UnknownNode { name: "n".into() }.is_configuration());
        assert!(!DocuflowError::ModelApi {
            message: "503".into()
        }
        .is_configuration());
        assert!(!DocuflowError::StepLimitExceeded { limit: 1 }.is_configuration());
    }
}
