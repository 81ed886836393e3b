//! Strategies: build the message sequence for a model call from run state.
//!
//! Both variants produce the same two-message shape — the variant's system
//! prompt followed by one user message carrying `state.input` — and consult
//! no other state fields. Strategies are the only place prompts enter a
//! request; parsers and middleware never touch prompt text.

use crate::state::{ChatMessage, WorkflowState};

/// Builds the ordered message sequence for one model invocation.
pub trait Strategy: Send + Sync {
    fn build_messages(&self, state: &WorkflowState) -> Vec<ChatMessage>;
}

/// Strategy for the planner agent.
pub struct PlanStrategy {
    system_prompt: String,
}

impl PlanStrategy {
    pub fn new(system_prompt: String) -> Self {
        Self { system_prompt }
    }
}

impl Strategy for PlanStrategy {
    fn build_messages(&self, state: &WorkflowState) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(state.input.clone()),
        ]
    }
}

/// Strategy for the extraction agent.
pub struct ExtractStrategy {
    system_prompt: String,
}

impl ExtractStrategy {
    pub fn new(system_prompt: String) -> Self {
        Self { system_prompt }
    }
}

impl Strategy for ExtractStrategy {
    fn build_messages(&self, state: &WorkflowState) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(state.input.clone()),
        ]
    }
}
