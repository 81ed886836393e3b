//! Agents: a [`Strategy`] that builds a model request from run state, paired
//! with a [`Parser`] that normalises the raw response into structured output.
//!
//! The pairing is closed over [`AgentKind`]: each variant maps through the
//! registration table in [`Agent::new`] to exactly one concrete
//! strategy/parser pair. Keeping the table explicit (rather than a
//! string-keyed lookup) makes "unknown agent type" unrepresentable and the
//! set of behaviours auditable in one place.

pub mod middleware;
pub mod parser;
pub mod strategy;

use crate::config::WorkflowConfig;
use crate::prompts;

pub use middleware::{InvocationPipeline, InvocationStage};
pub use parser::{ExtractParser, Parser, PlanParser};
pub use strategy::{ExtractStrategy, PlanStrategy, Strategy};

/// The agent variants this system knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    /// Plans extraction tasks from a user request.
    Plan,
    /// Extracts text from a document reference.
    Extract,
}

/// A strategy/parser pair, ready to be driven by the
/// [`InvocationPipeline`].
pub struct Agent {
    kind: AgentKind,
    strategy: Box<dyn Strategy>,
    parser: Box<dyn Parser>,
}

impl Agent {
    /// Construct the agent for a variant, resolving its system prompt once.
    ///
    /// Prompt overrides come from the run config; absent an override, the
    /// built-in prompt for the variant applies.
    pub fn new(kind: AgentKind, config: &WorkflowConfig) -> Self {
        let (strategy, parser): (Box<dyn Strategy>, Box<dyn Parser>) = match kind {
            AgentKind::Plan => {
                let prompt = config
                    .plan_prompt
                    .clone()
                    .unwrap_or_else(|| prompts::system_prompt(kind).to_string());
                (Box::new(PlanStrategy::new(prompt)), Box::new(PlanParser))
            }
            AgentKind::Extract => {
                let prompt = config
                    .extract_prompt
                    .clone()
                    .unwrap_or_else(|| prompts::system_prompt(kind).to_string());
                (
                    Box::new(ExtractStrategy::new(prompt)),
                    Box::new(ExtractParser),
                )
            }
        };

        Self {
            kind,
            strategy,
            parser,
        }
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub(crate) fn strategy(&self) -> &dyn Strategy {
        self.strategy.as_ref()
    }

    pub(crate) fn parser(&self) -> &dyn Parser {
        self.parser.as_ref()
    }
}
