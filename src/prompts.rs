//! System prompts for the planner and extraction agents.
//!
//! Prompts are centralised here so changing an agent's behaviour means
//! editing exactly one place, and unit tests can inspect prompt text without
//! touching a model backend. Strategies resolve their prompt once at
//! construction; callers can override per run via
//! [`crate::config::WorkflowConfigBuilder::plan_prompt`] and
//! [`crate::config::WorkflowConfigBuilder::extract_prompt`].

use crate::agent::AgentKind;

/// Default system prompt for the planner agent.
pub const PLAN_SYSTEM_PROMPT: &str = r#"You are a document-processing planner. The user describes what they want done with a document.

Decide which extraction tasks are needed and respond with a JSON object of the form:

{"tasks": [{"type": "EXTRACT", "input": "<document reference>"}]}

Rules:
- "input" must be the document reference exactly as the user gave it (a file path or name).
- Emit one task per document that needs text extraction.
- If no extraction work is needed, respond with {"tasks": []} and a short explanation in a "content" field.
- Respond with the JSON object only. Do not add commentary outside it."#;

/// Default system prompt for the extraction agent.
pub const EXTRACT_SYSTEM_PROMPT: &str = r#"You are a document text extractor. The user message is a reference to a document or page image.

Return the complete plain text content of that document, preserving reading order. Do not summarise, annotate, or add commentary — output the extracted text only."#;

/// The built-in system prompt for an agent variant.
pub fn system_prompt(kind: AgentKind) -> &'static str {
    match kind {
        AgentKind::Plan => PLAN_SYSTEM_PROMPT,
        AgentKind::Extract => EXTRACT_SYSTEM_PROMPT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_prompt_demands_json_tasks() {
        assert!(PLAN_SYSTEM_PROMPT.contains(r#""tasks""#));
        assert!(PLAN_SYSTEM_PROMPT.contains("EXTRACT"));
    }

    #[test]
    fn prompts_differ_per_variant() {
        assert_ne!(system_prompt(AgentKind::Plan), system_prompt(AgentKind::Extract));
    }
}
