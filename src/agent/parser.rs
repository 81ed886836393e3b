//! Parsers: normalise a raw model response into an [`AgentResult`].
//!
//! Parsing never fails. Models routinely wrap JSON in prose or fences,
//! return bare text when asked for structure, or answer through backends
//! with different response shapes — so each parser defines a degradation
//! order and always lands on a usable result:
//!
//! * **Plan**: text → fenced ```json block, else first brace-delimited span,
//!   deserialised into [`PlanOutput`] (a `tasks` field survives
//!   structurally); anything unparseable becomes plain content. A
//!   structured message passes its content through.
//! * **Extract**: the content field when structured, the text itself
//!   otherwise.
//!
//! A *failed* model call is a different thing entirely and is raised by the
//! middleware before any parser runs.

use crate::model::ModelRaw;
use crate::state::{AgentResult, ExtractionOutput, PlanOutput};
use once_cell::sync::Lazy;
use regex::Regex;

/// Normalises a raw model response; total over all inputs.
pub trait Parser: Send + Sync {
    fn parse(&self, raw: ModelRaw) -> AgentResult;
}

// Fenced block first: models that fence their JSON usually also add prose
// around it, which would confuse the brace scan.
static RE_JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```json\n([\s\S]*?)\n```").unwrap());
static RE_BRACE_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[\s\S]*\}").unwrap());

/// Parser for the planner agent.
pub struct PlanParser;

impl PlanParser {
    /// Extract and deserialise an embedded JSON object, if any.
    fn scan_embedded_json(text: &str) -> Option<PlanOutput> {
        let candidate = RE_JSON_FENCE
            .captures(text)
            .map(|c| c.get(1).unwrap().as_str())
            .or_else(|| RE_BRACE_SPAN.find(text).map(|m| m.as_str()))?;

        serde_json::from_str::<PlanOutput>(candidate).ok()
    }
}

impl Parser for PlanParser {
    fn parse(&self, raw: ModelRaw) -> AgentResult {
        let plan = match raw {
            ModelRaw::Text(text) => {
                Self::scan_embedded_json(&text).unwrap_or_else(|| PlanOutput {
                    content: text,
                    tasks: None,
                })
            }
            ModelRaw::Message(message) => PlanOutput {
                content: message.content,
                tasks: None,
            },
        };
        AgentResult::Plan(plan)
    }
}

/// Parser for the extraction agent.
pub struct ExtractParser;

impl Parser for ExtractParser {
    fn parse(&self, raw: ModelRaw) -> AgentResult {
        let extracted_text = match raw {
            ModelRaw::Message(message) => message.content,
            ModelRaw::Text(text) => text,
        };
        AgentResult::Extraction(ExtractionOutput { extracted_text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelMessage;
    use crate::state::TaskKind;

    fn plan(raw: ModelRaw) -> PlanOutput {
        match PlanParser.parse(raw) {
            AgentResult::Plan(p) => p,
            other => panic!("expected plan result, got {other:?}"),
        }
    }

    fn extraction(raw: ModelRaw) -> ExtractionOutput {
        match ExtractParser.parse(raw) {
            AgentResult::Extraction(e) => e,
            other => panic!("expected extraction result, got {other:?}"),
        }
    }

    #[test]
    fn plan_parses_fenced_json() {
        let raw = ModelRaw::Text(
            "```json\n{\"tasks\":[{\"type\":\"EXTRACT\",\"input\":\"a.pdf\"}]}\n```".into(),
        );
        let output = plan(raw);
        let tasks = output.tasks.expect("tasks preserved");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].kind, TaskKind::Extract);
        assert_eq!(tasks[0].input, "a.pdf");
    }

    #[test]
    fn plan_parses_brace_span_with_surrounding_prose() {
        let raw = ModelRaw::Text(
            "Here is the plan: {\"tasks\":[{\"type\":\"EXTRACT\",\"input\":\"b.pdf\"}]} done."
                .into(),
        );
        let output = plan(raw);
        assert_eq!(output.tasks.unwrap()[0].input, "b.pdf");
    }

    #[test]
    fn plan_falls_back_to_content_on_malformed_json() {
        let raw = ModelRaw::Text("{this is not json".into());
        let output = plan(raw);
        assert_eq!(output.content, "{this is not json");
        assert!(output.tasks.is_none());
    }

    #[test]
    fn plan_falls_back_to_content_on_plain_text() {
        let raw = ModelRaw::Text("I will run OCR on the file.".into());
        let output = plan(raw);
        assert_eq!(output.content, "I will run OCR on the file.");
        assert!(output.tasks.is_none());
    }

    #[test]
    fn plan_passes_structured_content_through() {
        let raw = ModelRaw::Message(ModelMessage {
            content: "structured reply".into(),
            tasks: None,
        });
        let output = plan(raw);
        assert_eq!(output.content, "structured reply");
        assert!(output.tasks.is_none());
    }

    #[test]
    fn plan_json_with_content_only() {
        let raw = ModelRaw::Text(r#"{"content":"nothing to do"}"#.into());
        let output = plan(raw);
        assert_eq!(output.content, "nothing to do");
        assert!(output.tasks.is_none());
    }

    #[test]
    fn extract_takes_structured_content() {
        let raw = ModelRaw::Message(ModelMessage {
            content: "hello".into(),
            tasks: None,
        });
        assert_eq!(extraction(raw).extracted_text, "hello");
    }

    #[test]
    fn extract_takes_plain_text_as_is() {
        let raw = ModelRaw::Text("hello".into());
        assert_eq!(extraction(raw).extracted_text, "hello");
    }
}
