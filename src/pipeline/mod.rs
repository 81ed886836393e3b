//! The declarative step-pipeline runner.
//!
//! A pipeline is a JSON document listing steps, each naming a service from
//! the closed registry plus templated parameters. The runner executes steps
//! strictly in order, threading each step's output into later steps'
//! `{{name}}` placeholders:
//!
//! ```json
//! {
//!   "name": "pdf-ocr",
//!   "steps": [
//!     { "id": "convert", "service": "pdfToImage",
//!       "params": { "inputPath": "{{document}}", "outDir": "data" } },
//!     { "id": "read", "service": "pdfToText",
//!       "params": { "inputPath": "{{document}}", "outDir": "data" } }
//!   ]
//! }
//! ```
//!
//! Unlike the graph engine — whose routing is decided at runtime by
//! predicates over merged state — a pipeline's shape is fixed when it is
//! written. The two interpreters share nothing but the sequential-merge
//! discipline.

pub mod definition;
pub mod runner;
pub mod template;

pub use definition::{PipelineDefinition, PipelineStep};
pub use runner::{PipelineRunner, PipelineVariables};
pub use template::resolve_params;
