//! The concrete plan→extract workflow graph.
//!
//! ```text
//! START ──▶ orchestrator ──┬─▶ extractor ──▶ END
//!           (plan tasks)   │   (run each EXTRACT task)
//!                          └─▶ END  (no tasks planned)
//! ```
//!
//! The orchestrator invokes the planner agent and derives a task list from
//! its result; the conditional edge hands non-empty lists to the extractor,
//! which runs the extraction agent once per task and records results keyed
//! by each task's input reference.

use crate::agent::{Agent, AgentKind, InvocationPipeline};
use crate::config::WorkflowConfig;
use crate::error::DocuflowError;
use crate::model::resolve_client;
use crate::state::{
    AgentResult, ChatMessage, PlanOutput, StateUpdate, Task, TaskKind, WorkflowState,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::engine::{CompiledGraph, GraphBuilder, GraphNode, END, START};

/// Planner node: asks the model what work the input needs.
struct OrchestratorNode {
    agent: Agent,
    pipeline: Arc<InvocationPipeline>,
}

impl OrchestratorNode {
    /// Derive the task list from a plan result.
    ///
    /// A structured `tasks` field wins. Failing that, a plan that merely
    /// *mentions* OCR is taken as a request to extract the run input — a
    /// keyword heuristic kept for models that do not yet honour the JSON
    /// contract; the structured path is always preferred when present.
    fn derive_tasks(plan: &PlanOutput, input: &str) -> Vec<Task> {
        if let Some(ref tasks) = plan.tasks {
            return tasks.clone();
        }
        if plan.content.to_lowercase().contains("ocr") {
            return vec![Task::extract(input)];
        }
        Vec::new()
    }
}

#[async_trait]
impl GraphNode for OrchestratorNode {
    async fn run(&self, state: &WorkflowState) -> Result<StateUpdate, DocuflowError> {
        info!("orchestrator: planning for '{}'", state.input);
        let result = self.pipeline.run(&self.agent, state).await?;

        let plan = match result {
            AgentResult::Plan(plan) => plan,
            // The registration table pairs this node with the plan parser,
            // which only produces Plan results.
            other => {
                return Err(DocuflowError::Internal(format!(
                    "planner produced a non-plan result: {other:?}"
                )))
            }
        };

        let tasks = Self::derive_tasks(&plan, &state.input);
        debug!("orchestrator derived {} task(s)", tasks.len());

        let serialized = serde_json::to_string(&plan)
            .map_err(|e| DocuflowError::Internal(format!("serialize plan: {e}")))?;

        Ok(StateUpdate {
            messages: vec![ChatMessage::assistant(serialized)],
            tasks: Some(tasks),
            ..Default::default()
        })
    }
}

/// Extractor node: runs the extraction agent once per EXTRACT task.
struct ExtractorNode {
    agent: Agent,
    pipeline: Arc<InvocationPipeline>,
}

#[async_trait]
impl GraphNode for ExtractorNode {
    async fn run(&self, state: &WorkflowState) -> Result<StateUpdate, DocuflowError> {
        let mut results: BTreeMap<String, AgentResult> = BTreeMap::new();

        // Strictly sequential: tasks write disjoint result keys, but the
        // observed contract is total ordering within a run.
        for task in &state.tasks {
            if task.kind != TaskKind::Extract {
                warn!("skipping {} task '{}'", task.kind, task.input);
                continue;
            }

            info!("extractor: processing '{}'", task.input);
            let task_state = WorkflowState::with_input(task.input.clone());
            let result = self.pipeline.run(&self.agent, &task_state).await?;
            results.insert(task.input.clone(), result);
        }

        Ok(StateUpdate {
            results,
            ..Default::default()
        })
    }
}

/// Route taken after planning: extract when there is work, else finish.
fn after_planning(state: &WorkflowState) -> String {
    if state.tasks.is_empty() {
        END.to_string()
    } else {
        "extractor".to_string()
    }
}

/// Assemble the workflow graph over a prepared invocation pipeline.
pub fn build_workflow_graph(
    pipeline: Arc<InvocationPipeline>,
    config: &WorkflowConfig,
) -> Result<CompiledGraph, DocuflowError> {
    GraphBuilder::new()
        .add_node(
            "orchestrator",
            OrchestratorNode {
                agent: Agent::new(AgentKind::Plan, config),
                pipeline: Arc::clone(&pipeline),
            },
        )
        .add_node(
            "extractor",
            ExtractorNode {
                agent: Agent::new(AgentKind::Extract, config),
                pipeline,
            },
        )
        .add_edge(START, "orchestrator")
        .add_conditional_edge("orchestrator", after_planning, ["extractor", END])
        .add_edge("extractor", END)
        .compile()
}

/// Run the plan→extract workflow for one input.
///
/// This is the crate's primary entry point. The returned state carries the
/// full transcript, the final task list, and one result per processed task.
///
/// # Errors
/// Fails on configuration problems (no backend resolvable) and on any
/// unrecovered model-call failure; no partial results are returned.
pub async fn run_workflow(
    input: impl AsRef<str>,
    config: &WorkflowConfig,
) -> Result<WorkflowState, DocuflowError> {
    let input = input.as_ref();
    info!("starting workflow run: '{input}'");

    let client = resolve_client(config)?;
    let pipeline = Arc::new(InvocationPipeline::new(client));
    let graph = build_workflow_graph(pipeline, config)?;

    let state = graph
        .invoke(StateUpdate::seed_input(input), config.max_steps)
        .await?;

    info!(
        "workflow complete: {} task(s), {} result(s)",
        state.tasks.len(),
        state.results.len()
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_tasks_win_over_keyword() {
        let plan = PlanOutput {
            content: "running ocr".into(),
            tasks: Some(vec![Task::extract("planned.pdf")]),
        };
        let tasks = OrchestratorNode::derive_tasks(&plan, "fallback.pdf");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].input, "planned.pdf");
    }

    #[test]
    fn keyword_fallback_targets_run_input() {
        let plan = PlanOutput {
            content: "I would run OCR over this document.".into(),
            tasks: None,
        };
        let tasks = OrchestratorNode::derive_tasks(&plan, "doc.pdf");
        assert_eq!(tasks, vec![Task::extract("doc.pdf")]);
    }

    #[test]
    fn no_tasks_without_keyword() {
        let plan = PlanOutput {
            content: "Nothing to do here.".into(),
            tasks: None,
        };
        assert!(OrchestratorNode::derive_tasks(&plan, "doc.pdf").is_empty());
    }

    #[test]
    fn routing_follows_task_presence() {
        let mut state = WorkflowState::default();
        assert_eq!(after_planning(&state), END);

        state.tasks = vec![Task::extract("a.pdf")];
        assert_eq!(after_planning(&state), "extractor");
    }
}
