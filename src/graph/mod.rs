//! The graph engine and the concrete plan→extract workflow built on it.
//!
//! [`engine`] is a small, generic interpreter: named nodes connected by
//! static or conditional edges, executed sequentially, each node's partial
//! output merged into shared state through the channel reducers. It knows
//! nothing about agents or documents.
//!
//! [`workflow`] assembles the one graph this crate ships — planner node,
//! conditional hand-off, extractor node — and exposes
//! [`workflow::run_workflow`] as the crate's primary entry point.

pub mod engine;
pub mod workflow;

pub use engine::{CompiledGraph, Edge, GraphBuilder, GraphNode, END, START};
pub use workflow::{build_workflow_graph, run_workflow};
