//! Shared run state: named channels with explicit merge functions.
//!
//! A workflow run owns one [`WorkflowState`]. Graph nodes never mutate it
//! directly — they return a partial [`StateUpdate`], and the executor merges
//! it channel by channel through [`WorkflowState::apply`]. Each channel has
//! a fixed reducer:
//!
//! | channel    | reducer                                           |
//! |------------|---------------------------------------------------|
//! | `messages` | append, order preserved                           |
//! | `input`    | overwrite                                         |
//! | `tasks`    | replace when incoming is non-empty, else keep     |
//! | `results`  | key-wise union (adds/overwrites, never deletes)   |
//!
//! Reducers are pure and total; the table is fixed at compile time rather
//! than looked up per run, so a node cannot invent a channel the executor
//! does not know how to merge.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ── Messages ─────────────────────────────────────────────────────────────

/// Role of a chat message sent to a model backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One chat message in the run transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ── Tasks ────────────────────────────────────────────────────────────────

/// Which agent variant processes a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskKind {
    /// Handled by the planner agent.
    Plan,
    /// Handled by the extraction agent.
    Extract,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Plan => write!(f, "PLAN"),
            TaskKind::Extract => write!(f, "EXTRACT"),
        }
    }
}

/// One unit of planned work.
///
/// `input` is an opaque reference (typically a file path) and doubles as the
/// key under which the task's result is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub input: String,
}

impl Task {
    pub fn extract(input: impl Into<String>) -> Self {
        Self {
            kind: TaskKind::Extract,
            input: input.into(),
        }
    }
}

// ── Agent results ────────────────────────────────────────────────────────

/// Parsed output of a planner invocation.
///
/// Either field may be absent in the model's JSON; a missing `content`
/// deserialises to the empty string and a missing `tasks` to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanOutput {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
}

/// Parsed output of an extraction invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutput {
    #[serde(rename = "extractedText")]
    pub extracted_text: String,
}

/// Structured output of one agent invocation; shape depends on the variant.
///
/// Serialises untagged so a plan result writes `{"content": …, "tasks": …}`
/// and an extraction result `{"extractedText": …}`, matching the wire shapes
/// the rest of the system expects. `Extraction` is listed first because its
/// required field disambiguates untagged deserialisation (a `Plan` with both
/// fields defaulted would otherwise match any object).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentResult {
    Extraction(ExtractionOutput),
    Plan(PlanOutput),
}

impl AgentResult {
    /// The extracted text, when this is an extraction result.
    pub fn extracted_text(&self) -> Option<&str> {
        match self {
            AgentResult::Extraction(e) => Some(&e.extracted_text),
            AgentResult::Plan(_) => None,
        }
    }
}

// ── State and updates ────────────────────────────────────────────────────

/// The shared, channel-merged state of one workflow run.
///
/// Created fresh per run and discarded at run end; never shared across runs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkflowState {
    /// Conversation transcript; grows monotonically.
    pub messages: Vec<ChatMessage>,
    /// The run's current input reference.
    pub input: String,
    /// The task list most recently emitted by the planner.
    pub tasks: Vec<Task>,
    /// Extraction results keyed by each task's `input`.
    pub results: BTreeMap<String, AgentResult>,
}

impl WorkflowState {
    /// A fresh state carrying only the initial input.
    pub fn with_input(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    /// Merge a node's partial update into this state, one reducer per
    /// channel.
    pub fn apply(&mut self, update: StateUpdate) {
        merge_messages(&mut self.messages, update.messages);
        merge_input(&mut self.input, update.input);
        merge_tasks(&mut self.tasks, update.tasks);
        merge_results(&mut self.results, update.results);
    }
}

/// A partial state update returned by a graph node.
///
/// Untouched channels stay at their defaults and leave the corresponding
/// state channel unchanged when applied.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub messages: Vec<ChatMessage>,
    pub input: Option<String>,
    pub tasks: Option<Vec<Task>>,
    pub results: BTreeMap<String, AgentResult>,
}

impl StateUpdate {
    /// An update that only seeds the input channel.
    pub fn seed_input(input: impl Into<String>) -> Self {
        Self {
            input: Some(input.into()),
            ..Self::default()
        }
    }
}

// ── Channel reducers ─────────────────────────────────────────────────────

fn merge_messages(current: &mut Vec<ChatMessage>, incoming: Vec<ChatMessage>) {
    current.extend(incoming);
}

fn merge_input(current: &mut String, incoming: Option<String>) {
    if let Some(input) = incoming {
        *current = input;
    }
}

/// Replace-if-present: a non-empty incoming list replaces the whole list;
/// an absent or empty incoming list leaves the prior one untouched.
fn merge_tasks(current: &mut Vec<Task>, incoming: Option<Vec<Task>>) {
    match incoming {
        Some(tasks) if !tasks.is_empty() => *current = tasks,
        _ => {}
    }
}

fn merge_results(
    current: &mut BTreeMap<String, AgentResult>,
    incoming: BTreeMap<String, AgentResult>,
) {
    current.extend(incoming);
}
