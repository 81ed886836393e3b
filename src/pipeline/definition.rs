//! Pipeline definitions: the declarative document the runner executes.

use crate::error::DocuflowError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// One declared step: a service name plus its (possibly templated) params.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStep {
    /// Unique within the pipeline; completed output is stored under this
    /// name in the variable map.
    pub id: String,
    /// Registry entry to dispatch to.
    pub service: String,
    /// Parameter map; string values may contain `{{ name }}` placeholders.
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,
}

/// An ordered pipeline of steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDefinition {
    #[serde(default)]
    pub name: String,
    pub steps: Vec<PipelineStep>,
}

impl PipelineDefinition {
    /// Parse a definition from JSON text.
    pub fn from_json(text: &str) -> Result<Self, DocuflowError> {
        let definition: Self = serde_json::from_str(text)
            .map_err(|e| DocuflowError::InvalidDefinition(e.to_string()))?;
        definition.validate()?;
        Ok(definition)
    }

    /// Load and parse a definition from a JSON file.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DocuflowError> {
        let path = path.as_ref();
        let text =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| DocuflowError::DefinitionRead {
                    path: path.to_path_buf(),
                    source,
                })?;
        Self::from_json(&text)
    }

    /// Reject structurally-broken definitions before any step runs.
    pub fn validate(&self) -> Result<(), DocuflowError> {
        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.id.as_str()) {
                return Err(DocuflowError::DuplicateStepId {
                    id: step.id.clone(),
                });
            }
        }
        Ok(())
    }
}
