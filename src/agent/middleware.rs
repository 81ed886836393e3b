//! The invocation pipeline: the single seam that turns an agent plus state
//! into a parsed result.
//!
//! The sequence is fixed — build messages, run `before` stages in order,
//! make exactly one model call, parse, run `after` stages in order. Stages
//! exist so cross-cutting concerns (content moderation before the call,
//! output verification after it) can be added without touching any
//! Strategy or Parser contract. No retries happen here; a failed model call
//! aborts the run.

use crate::agent::Agent;
use crate::error::DocuflowError;
use crate::model::ModelClient;
use crate::state::{AgentResult, ChatMessage, WorkflowState};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// A cross-cutting stage wrapped around the invoke+parse step.
///
/// Both hooks default to no-ops; implement only the side you need. A stage
/// error aborts the run like any other external failure.
#[async_trait]
pub trait InvocationStage: Send + Sync {
    /// Runs after messages are built, before the model call. May rewrite
    /// the outgoing messages (e.g. redaction).
    async fn before_invoke(&self, messages: &mut Vec<ChatMessage>) -> Result<(), DocuflowError> {
        let _ = messages;
        Ok(())
    }

    /// Runs after parsing. May rewrite the result (e.g. scrubbing).
    async fn after_parse(&self, result: &mut AgentResult) -> Result<(), DocuflowError> {
        let _ = result;
        Ok(())
    }
}

/// Drives one agent invocation end to end.
pub struct InvocationPipeline {
    client: Arc<dyn ModelClient>,
    stages: Vec<Arc<dyn InvocationStage>>,
}

impl InvocationPipeline {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            stages: Vec::new(),
        }
    }

    /// Append a stage; stages run in insertion order on both sides of the
    /// model call.
    pub fn with_stage(mut self, stage: Arc<dyn InvocationStage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Build messages, invoke the model once, parse. The only place the
    /// core touches a model backend.
    pub async fn run(
        &self,
        agent: &Agent,
        state: &WorkflowState,
    ) -> Result<AgentResult, DocuflowError> {
        let mut messages = agent.strategy().build_messages(state);
        debug!(
            "invoking {:?} agent with {} messages",
            agent.kind(),
            messages.len()
        );

        for stage in &self.stages {
            stage.before_invoke(&mut messages).await?;
        }

        let raw = self.client.invoke(&messages).await?;

        let mut result = agent.parser().parse(raw);

        for stage in &self.stages {
            stage.after_parse(&mut result).await?;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentKind;
    use crate::config::WorkflowConfig;
    use crate::model::ModelRaw;
    use std::sync::Mutex;

    /// Client that records each request and answers with fixed text.
    struct RecordingClient {
        requests: Mutex<Vec<Vec<ChatMessage>>>,
        reply: String,
    }

    #[async_trait]
    impl ModelClient for RecordingClient {
        async fn invoke(&self, messages: &[ChatMessage]) -> Result<ModelRaw, DocuflowError> {
            self.requests.lock().unwrap().push(messages.to_vec());
            Ok(ModelRaw::Text(self.reply.clone()))
        }
    }

    struct TaggingStage;

    #[async_trait]
    impl InvocationStage for TaggingStage {
        async fn before_invoke(
            &self,
            messages: &mut Vec<ChatMessage>,
        ) -> Result<(), DocuflowError> {
            messages.push(ChatMessage::user("appended-by-stage"));
            Ok(())
        }

        async fn after_parse(&self, result: &mut AgentResult) -> Result<(), DocuflowError> {
            if let AgentResult::Extraction(e) = result {
                e.extracted_text.push_str(" [checked]");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn one_call_per_invocation() {
        let client = Arc::new(RecordingClient {
            requests: Mutex::new(Vec::new()),
            reply: "text".into(),
        });
        let pipeline = InvocationPipeline::new(client.clone());
        let agent = Agent::new(AgentKind::Extract, &WorkflowConfig::default());
        let state = WorkflowState::with_input("page.png");

        pipeline.run(&agent, &state).await.unwrap();
        assert_eq!(client.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stages_wrap_the_call_in_order() {
        let client = Arc::new(RecordingClient {
            requests: Mutex::new(Vec::new()),
            reply: "body".into(),
        });
        let pipeline =
            InvocationPipeline::new(client.clone()).with_stage(Arc::new(TaggingStage));
        let agent = Agent::new(AgentKind::Extract, &WorkflowConfig::default());
        let state = WorkflowState::with_input("page.png");

        let result = pipeline.run(&agent, &state).await.unwrap();

        // before_invoke ran before the client saw the messages
        let seen = client.requests.lock().unwrap();
        assert_eq!(seen[0].last().unwrap().content, "appended-by-stage");

        // after_parse ran on the parsed result
        assert_eq!(result.extracted_text(), Some("body [checked]"));
    }

    #[tokio::test]
    async fn failing_client_aborts() {
        struct FailingClient;

        #[async_trait]
        impl ModelClient for FailingClient {
            async fn invoke(&self, _: &[ChatMessage]) -> Result<ModelRaw, DocuflowError> {
                Err(DocuflowError::ModelApi {
                    message: "503".into(),
                })
            }
        }

        let pipeline = InvocationPipeline::new(Arc::new(FailingClient));
        let agent = Agent::new(AgentKind::Plan, &WorkflowConfig::default());
        let state = WorkflowState::with_input("x");

        let err = pipeline.run(&agent, &state).await.unwrap_err();
        assert!(matches!(err, DocuflowError::ModelApi { .. }));
    }
}
