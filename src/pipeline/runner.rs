//! Sequential executor for declarative pipelines.
//!
//! For each step, in declared order: resolve `{{name}}` placeholders
//! against the variables accumulated so far, dispatch to the named service,
//! and only then commit the step's output — under the step id and under the
//! service's alias (`images`, `ocr_results`, `text`). A failing step
//! commits nothing, so the returned error describes a run whose variable
//! map is exactly what it was before that step.

use crate::error::DocuflowError;
use crate::pipeline::definition::{PipelineDefinition, PipelineStep};
use crate::pipeline::template::resolve_params;
use crate::services::{DocumentServices, ServiceKind};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Variables accumulated across a pipeline run.
pub type PipelineVariables = BTreeMap<String, Value>;

/// Executes [`PipelineDefinition`]s against a set of document services.
pub struct PipelineRunner {
    services: Arc<dyn DocumentServices>,
    default_out_dir: PathBuf,
}

impl PipelineRunner {
    /// A runner writing tool output under `data/` unless a step says
    /// otherwise.
    pub fn new(services: Arc<dyn DocumentServices>) -> Self {
        Self {
            services,
            default_out_dir: PathBuf::from("data"),
        }
    }

    /// Override the output directory used when a step omits `outDir`.
    pub fn with_default_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.default_out_dir = dir.into();
        self
    }

    /// Run every step in order; returns the final variable map.
    ///
    /// # Errors
    /// Duplicate step ids, unknown service names, and missing required
    /// params are configuration errors; tool failures are external-call
    /// errors. Either way the run stops at the offending step with no
    /// variables committed for it.
    pub async fn run(
        &self,
        definition: &PipelineDefinition,
        initial: PipelineVariables,
    ) -> Result<PipelineVariables, DocuflowError> {
        definition.validate()?;

        let label = if definition.name.is_empty() {
            "<unnamed>"
        } else {
            &definition.name
        };
        info!("pipeline '{label}': {} step(s)", definition.steps.len());

        let mut vars = initial;
        for step in &definition.steps {
            self.run_step(step, &mut vars).await?;
        }
        Ok(vars)
    }

    async fn run_step(
        &self,
        step: &PipelineStep,
        vars: &mut PipelineVariables,
    ) -> Result<(), DocuflowError> {
        let kind = ServiceKind::parse(&step.id, &step.service)?;
        let params = resolve_params(&step.params, vars);
        debug!("step '{}' → {:?}", step.id, kind);

        let input_path = PathBuf::from(required_str(step, &params, "inputPath")?);
        let out_dir = match params.get("outDir").and_then(Value::as_str) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => self.default_out_dir.clone(),
        };

        match kind {
            ServiceKind::PdfToImage => {
                let images = self.services.pdf_to_image(&input_path, &out_dir).await?;
                let paths: Vec<String> = images
                    .iter()
                    .map(|p| p.to_string_lossy().into_owned())
                    .collect();
                info!("step '{}': {} image(s)", step.id, paths.len());

                vars.insert(step.id.clone(), json!(paths));
                vars.insert("images".to_string(), json!(paths));
            }
            ServiceKind::PdfToText => {
                let texts = self.services.pdf_to_text(&input_path, &out_dir).await?;
                info!("step '{}': {} page(s) of text", step.id, texts.len());

                // BTreeMap iteration is key-sorted, and image names sort in
                // page order, so the joined text reads front to back.
                let joined = texts.values().cloned().collect::<Vec<_>>().join("\n\n");

                vars.insert(step.id.clone(), json!(texts));
                vars.insert("ocr_results".to_string(), json!(texts));
                vars.insert("text".to_string(), json!(joined));
            }
        }
        Ok(())
    }
}

fn required_str<'p>(
    step: &PipelineStep,
    params: &'p BTreeMap<String, Value>,
    name: &str,
) -> Result<&'p str, DocuflowError> {
    params
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DocuflowError::MissingParam {
            step: step.id.clone(),
            param: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::DocumentServices;
    use async_trait::async_trait;
    use std::path::Path;

    /// In-memory services: two fixed page images, OCR text per image with
    /// one simulated per-image failure.
    struct FakeServices;

    #[async_trait]
    impl DocumentServices for FakeServices {
        async fn pdf_to_image(
            &self,
            input_path: &Path,
            out_dir: &Path,
        ) -> Result<Vec<PathBuf>, DocuflowError> {
            let stem = input_path.file_stem().unwrap().to_string_lossy();
            Ok(vec![
                out_dir.join(format!("{stem}-1.jpg")),
                out_dir.join(format!("{stem}-2.jpg")),
            ])
        }

        async fn pdf_to_text(
            &self,
            input_path: &Path,
            out_dir: &Path,
        ) -> Result<BTreeMap<String, String>, DocuflowError> {
            let images = self.pdf_to_image(input_path, out_dir).await?;
            let mut texts = BTreeMap::new();
            texts.insert(
                images[0].to_string_lossy().into_owned(),
                "page one".to_string(),
            );
            texts.insert(
                images[1].to_string_lossy().into_owned(),
                "ERROR: glyph soup".to_string(),
            );
            Ok(texts)
        }
    }

    fn definition(json_text: &str) -> PipelineDefinition {
        PipelineDefinition::from_json(json_text).unwrap()
    }

    #[tokio::test]
    async fn pdf_to_image_stores_id_and_alias() {
        let runner = PipelineRunner::new(Arc::new(FakeServices));
        let def = definition(
            r#"{ "steps": [
                { "id": "convert", "service": "pdfToImage",
                  "params": { "inputPath": "{{doc}}", "outDir": "/out" } }
            ] }"#,
        );
        let mut initial = PipelineVariables::new();
        initial.insert("doc".into(), json!("scan.pdf"));

        let vars = runner.run(&def, initial).await.unwrap();
        assert_eq!(vars["convert"], vars["images"]);
        assert_eq!(vars["images"][0], "/out/scan-1.jpg");
        // seed variables survive
        assert_eq!(vars["doc"], "scan.pdf");
    }

    #[tokio::test]
    async fn pdf_to_text_stores_joined_alias() {
        let runner = PipelineRunner::new(Arc::new(FakeServices));
        let def = definition(
            r#"{ "steps": [
                { "id": "read", "service": "pdfToText",
                  "params": { "inputPath": "scan.pdf", "outDir": "/out" } }
            ] }"#,
        );

        let vars = runner.run(&def, PipelineVariables::new()).await.unwrap();
        assert_eq!(vars["read"], vars["ocr_results"]);
        let text = vars["text"].as_str().unwrap();
        assert_eq!(text, "page one\n\nERROR: glyph soup");
    }

    #[tokio::test]
    async fn unknown_service_aborts_without_committing() {
        let runner = PipelineRunner::new(Arc::new(FakeServices));
        let def = definition(
            r#"{ "steps": [
                { "id": "convert", "service": "pdfToImage",
                  "params": { "inputPath": "scan.pdf" } },
                { "id": "summarise", "service": "pdfToAudio",
                  "params": { "inputPath": "scan.pdf" } }
            ] }"#,
        );

        let err = runner
            .run(&def, PipelineVariables::new())
            .await
            .unwrap_err();
        match err {
            DocuflowError::UnknownService { step, name } => {
                assert_eq!(step, "summarise");
                assert_eq!(name, "pdfToAudio");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_input_path_is_a_configuration_error() {
        let runner = PipelineRunner::new(Arc::new(FakeServices));
        let def = definition(
            r#"{ "steps": [ { "id": "convert", "service": "pdfToImage" } ] }"#,
        );

        let err = runner
            .run(&def, PipelineVariables::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DocuflowError::MissingParam { .. }));
    }

    #[tokio::test]
    async fn omitted_out_dir_uses_runner_default() {
        let runner =
            PipelineRunner::new(Arc::new(FakeServices)).with_default_out_dir("/fallback");
        let def = definition(
            r#"{ "steps": [
                { "id": "convert", "service": "pdfToImage",
                  "params": { "inputPath": "scan.pdf" } }
            ] }"#,
        );

        let vars = runner.run(&def, PipelineVariables::new()).await.unwrap();
        assert_eq!(vars["images"][0], "/fallback/scan-1.jpg");
    }

    #[tokio::test]
    async fn later_steps_see_earlier_outputs() {
        let runner = PipelineRunner::new(Arc::new(FakeServices));
        // The second step templates its inputPath from the first step's
        // alias; FakeServices reflects the input stem into its image names.
        let def = definition(
            r#"{ "steps": [
                { "id": "first", "service": "pdfToImage",
                  "params": { "inputPath": "alpha.pdf", "outDir": "/o" } },
                { "id": "second", "service": "pdfToText",
                  "params": { "inputPath": "{{first}}", "outDir": "/o" } }
            ] }"#,
        );

        // `{{first}}` renders the path array as compact JSON; the fake
        // service only echoes the stem, so this proves the substitution
        // happened rather than exercising a real tool contract.
        let vars = runner.run(&def, PipelineVariables::new()).await.unwrap();
        assert!(vars.contains_key("ocr_results"));
        let keys: Vec<&String> = vars["second"].as_object().unwrap().keys().collect();
        assert!(keys[0].contains("alpha"));
    }
}
