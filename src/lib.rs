//! # docuflow
//!
//! Orchestrate document-understanding work with LLM agents.
//!
//! ## Why this crate?
//!
//! Pointing a single model call at "process this document" conflates two
//! decisions — *what work is needed* and *doing the work*. This crate keeps
//! them apart: a planner agent turns the request into a task list, extraction
//! agents execute the tasks, and a small state graph mediates the hand-off
//! through explicitly-merged channels. For fixed recipes ("convert this PDF,
//! then OCR every page") a separate declarative pipeline runner executes
//! JSON-defined steps with `{{variable}}` threading between them.
//!
//! ## Workflow Overview
//!
//! ```text
//! input
//!  │
//!  ├─ 1. Plan      planner agent proposes tasks (JSON, with fallbacks)
//!  ├─ 2. Route     conditional edge: tasks? → extract, none → done
//!  ├─ 3. Extract   extraction agent runs per task, sequentially
//!  └─ 4. Merge     channel reducers fold every node output into run state
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docuflow::{run_workflow, WorkflowConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Backend auto-detected from OPENAI_API_KEY / OLLAMA_MODEL / USE_MOCK
//!     let config = WorkflowConfig::default();
//!     let state = run_workflow("Process invoice.pdf", &config).await?;
//!     for (input, result) in &state.results {
//!         println!("{input}: {:?}", result.extracted_text());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Declarative pipelines run against the service registry instead of an LLM:
//!
//! ```rust,no_run
//! use docuflow::{LocalToolchain, PipelineDefinition, PipelineRunner};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let definition = PipelineDefinition::from_json_file("graphs/pdf-ocr.json").await?;
//! let runner = PipelineRunner::new(Arc::new(LocalToolchain::new()));
//! let vars = runner.run(&definition, Default::default()).await?;
//! println!("{}", vars["text"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docuflow` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docuflow = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod agent;
pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod pipeline;
pub mod prompts;
pub mod services;
pub mod state;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use agent::{Agent, AgentKind, InvocationPipeline, InvocationStage};
pub use config::{WorkflowConfig, WorkflowConfigBuilder};
pub use error::DocuflowError;
pub use graph::{build_workflow_graph, run_workflow, CompiledGraph, GraphBuilder, GraphNode, END, START};
pub use model::{MockClient, ModelClient, ModelMessage, ModelRaw, OllamaClient, OpenAiClient};
pub use pipeline::{PipelineDefinition, PipelineRunner, PipelineStep, PipelineVariables};
pub use services::{DocumentServices, LocalToolchain, ServiceKind};
pub use state::{
    AgentResult, ChatMessage, ExtractionOutput, PlanOutput, Role, StateUpdate, Task, TaskKind,
    WorkflowState,
};
