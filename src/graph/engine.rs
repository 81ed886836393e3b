//! Generic state-graph executor.
//!
//! A graph is a set of named nodes, each with exactly one outgoing edge —
//! either static (always the same target) or conditional (a predicate over
//! the merged state picks among declared targets). Execution starts at the
//! node the [`START`] edge points to and stops when a transition lands on
//! [`END`].
//!
//! The executor is strictly sequential within a run: a node's update is
//! fully merged before the next transition is resolved, so predicates
//! always observe a consistent state. Termination is the builder's
//! responsibility (the shipped workflow graph is acyclic); a step ceiling
//! turns an accidental cycle into an error instead of a hang.

use crate::error::DocuflowError;
use crate::state::{StateUpdate, WorkflowState};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// Virtual entry point; `add_edge(START, …)` declares the initial node.
pub const START: &str = "__start__";
/// Terminal sentinel; transitioning here ends the run.
pub const END: &str = "__end__";

/// A unit of work: reads the merged state, returns a partial update.
#[async_trait]
pub trait GraphNode: Send + Sync {
    async fn run(&self, state: &WorkflowState) -> Result<StateUpdate, DocuflowError>;
}

/// Transition out of a node.
pub enum Edge {
    /// Always the same target.
    Static(String),
    /// A predicate over the merged state chooses among `targets`.
    Conditional {
        decide: Box<dyn Fn(&WorkflowState) -> String + Send + Sync>,
        targets: Vec<String>,
    },
}

/// Builder for a [`CompiledGraph`]; validation happens in [`compile`].
///
/// [`compile`]: GraphBuilder::compile
#[derive(Default)]
pub struct GraphBuilder {
    nodes: HashMap<String, Box<dyn GraphNode>>,
    edges: HashMap<String, Edge>,
    duplicate: Option<String>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(mut self, name: impl Into<String>, node: impl GraphNode + 'static) -> Self {
        let name = name.into();
        if self.nodes.insert(name.clone(), Box::new(node)).is_some() {
            self.duplicate.get_or_insert(name);
        }
        self
    }

    /// Declare a static edge. `add_edge(START, n)` sets the entry node.
    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edges.insert(from.into(), Edge::Static(to.into()));
        self
    }

    /// Declare a conditional edge with its full set of possible targets.
    pub fn add_conditional_edge(
        mut self,
        from: impl Into<String>,
        decide: impl Fn(&WorkflowState) -> String + Send + Sync + 'static,
        targets: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.edges.insert(
            from.into(),
            Edge::Conditional {
                decide: Box::new(decide),
                targets: targets.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    /// Validate the topology and freeze it.
    pub fn compile(self) -> Result<CompiledGraph, DocuflowError> {
        if let Some(name) = self.duplicate {
            return Err(DocuflowError::DuplicateNode { name });
        }

        let entry = match self.edges.get(START) {
            Some(Edge::Static(to)) => to.clone(),
            _ => {
                return Err(DocuflowError::MissingEdge {
                    node: START.to_string(),
                })
            }
        };

        // Every edge endpoint must be a known node (or END); every node
        // must have a way out.
        let known = |name: &str| name == END || self.nodes.contains_key(name);
        for (from, edge) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(DocuflowError::UnknownNode { name: from.clone() });
            }
            match edge {
                Edge::Static(to) => {
                    if !known(to) {
                        return Err(DocuflowError::UnknownNode { name: to.clone() });
                    }
                }
                Edge::Conditional { targets, .. } => {
                    for target in targets {
                        if !known(target) {
                            return Err(DocuflowError::UnknownNode {
                                name: target.clone(),
                            });
                        }
                    }
                }
            }
        }
        for name in self.nodes.keys() {
            if !self.edges.contains_key(name) {
                return Err(DocuflowError::MissingEdge { node: name.clone() });
            }
        }

        Ok(CompiledGraph {
            nodes: self.nodes,
            edges: self.edges,
            entry,
        })
    }
}

/// A validated, executable graph.
pub struct CompiledGraph {
    nodes: HashMap<String, Box<dyn GraphNode>>,
    edges: HashMap<String, Edge>,
    entry: String,
}

impl CompiledGraph {
    /// Run the graph to END from a fresh state seeded with `seed`.
    ///
    /// `max_steps` bounds the number of node executions.
    pub async fn invoke(
        &self,
        seed: StateUpdate,
        max_steps: usize,
    ) -> Result<WorkflowState, DocuflowError> {
        let mut state = WorkflowState::default();
        state.apply(seed);

        let mut current = self.entry.clone();
        let mut steps = 0usize;

        while current != END {
            if steps >= max_steps {
                return Err(DocuflowError::StepLimitExceeded { limit: max_steps });
            }
            steps += 1;

            let node = self
                .nodes
                .get(&current)
                .ok_or_else(|| DocuflowError::UnknownNode {
                    name: current.clone(),
                })?;

            debug!("running node '{current}' (step {steps})");
            let update = node.run(&state).await?;
            state.apply(update);

            current = self.next_node(&current, &state)?;
        }

        debug!("reached END after {steps} steps");
        Ok(state)
    }

    fn next_node(&self, from: &str, state: &WorkflowState) -> Result<String, DocuflowError> {
        match self.edges.get(from) {
            Some(Edge::Static(to)) => Ok(to.clone()),
            Some(Edge::Conditional { decide, targets }) => {
                let target = decide(state);
                if !targets.iter().any(|t| t == &target) {
                    return Err(DocuflowError::UndeclaredTarget {
                        node: from.to_string(),
                        target,
                    });
                }
                Ok(target)
            }
            None => Err(DocuflowError::MissingEdge {
                node: from.to_string(),
            }),
        }
    }
}
