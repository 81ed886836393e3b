//! Offline mock backend for local development and tests.
//!
//! The mock inspects the last message of the request (the user turn built by
//! the agent's strategy) and answers from three branches:
//!
//! * a "process this document" request mentioning a `.pdf` → a JSON task
//!   plan naming that file;
//! * any mention of "ocr" → a single-task plan for the mentioned file, or a
//!   placeholder name when none is given;
//! * a bare document reference (an extraction call) → canned extracted text
//!   for that reference.
//!
//! Responses are bare text (`ModelRaw::Text`) like a completion endpoint, so
//! the planner's embedded-JSON scan is exercised on exactly the payloads a
//! real model would produce.

use crate::error::DocuflowError;
use crate::state::{ChatMessage, Task};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use super::{ModelClient, ModelRaw};

static RE_PDF_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\S+\.pdf)").unwrap());
static RE_DOC_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\S+\.(?:pdf|png|jpe?g|tiff?))").unwrap());

/// A deterministic, network-free [`ModelClient`].
#[derive(Debug, Default)]
pub struct MockClient;

impl MockClient {
    pub fn new() -> Self {
        Self
    }

    fn plan_json(input: &str) -> String {
        json!({ "tasks": [Task::extract(input)] }).to_string()
    }
}

#[async_trait]
impl ModelClient for MockClient {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<ModelRaw, DocuflowError> {
        let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
        let lower = last.to_lowercase();
        let pdf = RE_PDF_TOKEN
            .captures(last)
            .map(|c| c[1].to_string());

        // "Process invoice.pdf" → a structured plan for that file.
        if lower.contains("process") {
            if let Some(filename) = pdf {
                return Ok(ModelRaw::Text(Self::plan_json(&filename)));
            }
        }

        // Any OCR request → a single-task plan, with a placeholder when no
        // path was mentioned.
        if lower.contains("ocr") {
            let input = pdf.unwrap_or_else(|| "uploaded.pdf".to_string());
            return Ok(ModelRaw::Text(Self::plan_json(&input)));
        }

        // A bare document reference is an extraction call.
        if let Some(caps) = RE_DOC_TOKEN.captures(last) {
            return Ok(ModelRaw::Text(format!(
                "Mock extracted text for {}.",
                &caps[1]
            )));
        }

        // Nothing recognised: an empty plan.
        Ok(ModelRaw::Text("[]".to_string()))
    }
}
