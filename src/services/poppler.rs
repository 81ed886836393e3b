//! Local toolchain adapter: Poppler's `pdftoppm` for conversion, Tesseract
//! for OCR, both driven as subprocesses.
//!
//! Subprocesses keep the crate free of native bindings: both tools are a
//! package-manager install away on every platform this runs on, and their
//! CLIs are stable. Each call spawns one process per document (conversion)
//! or per page image (OCR); the pipeline's sequential model means at most
//! one is alive at a time.
//!
//! Conversion writes into `outDir/img/<stem>/` so repeated runs against the
//! same output directory stay separated per document.

use crate::error::DocuflowError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::DocumentServices;

/// [`DocumentServices`] backed by `pdftoppm` and `tesseract`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalToolchain;

impl LocalToolchain {
    pub fn new() -> Self {
        Self
    }

    /// Cheap presence probe: `pdftoppm -v` exits 0 or 1 depending on
    /// version, so only a failure to spawn means the tool is missing.
    async fn check_pdftoppm() -> Result<(), DocuflowError> {
        match Command::new("pdftoppm").arg("-v").output().await {
            Ok(_) => Ok(()),
            Err(_) => Err(DocuflowError::ToolNotFound {
                tool: "pdftoppm".into(),
                hint: "Install Poppler.".into(),
            }),
        }
    }

    async fn ocr_image(image: &Path) -> Result<String, DocuflowError> {
        let output = Command::new("tesseract")
            .arg(image)
            .arg("stdout")
            .output()
            .await
            .map_err(|_| DocuflowError::ToolNotFound {
                tool: "tesseract".into(),
                hint: "Install Tesseract OCR.".into(),
            })?;

        if !output.status.success() {
            return Err(DocuflowError::ToolFailed {
                tool: "tesseract".into(),
                detail: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn is_page_image(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| {
                e.eq_ignore_ascii_case("jpg")
                    || e.eq_ignore_ascii_case("jpeg")
                    || e.eq_ignore_ascii_case("png")
            })
    }
}

#[async_trait]
impl DocumentServices for LocalToolchain {
    async fn pdf_to_image(
        &self,
        input_path: &Path,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>, DocuflowError> {
        Self::check_pdftoppm().await?;

        let stem = input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        let target_dir = out_dir.join("img").join(stem);
        tokio::fs::create_dir_all(&target_dir)
            .await
            .map_err(|e| DocuflowError::Internal(format!("create {}: {e}", target_dir.display())))?;

        let prefix = target_dir.join(stem);
        info!(
            "pdftoppm: {} → {}",
            input_path.display(),
            target_dir.display()
        );

        let output = Command::new("pdftoppm")
            .arg("-jpeg")
            .arg(input_path)
            .arg(&prefix)
            .output()
            .await
            .map_err(|e| DocuflowError::ToolFailed {
                tool: "pdftoppm".into(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(DocuflowError::ToolFailed {
                tool: "pdftoppm".into(),
                detail: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let mut images = Vec::new();
        let mut entries = tokio::fs::read_dir(&target_dir)
            .await
            .map_err(|e| DocuflowError::Internal(format!("read {}: {e}", target_dir.display())))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DocuflowError::Internal(e.to_string()))?
        {
            let path = entry.path();
            if Self::is_page_image(&path) {
                images.push(path);
            }
        }

        // pdftoppm zero-pads page numbers, so lexicographic order is page
        // order.
        images.sort();
        debug!("pdftoppm produced {} image(s)", images.len());
        Ok(images)
    }

    async fn pdf_to_text(
        &self,
        input_path: &Path,
        out_dir: &Path,
    ) -> Result<BTreeMap<String, String>, DocuflowError> {
        let images = self.pdf_to_image(input_path, out_dir).await?;

        let mut results = BTreeMap::new();
        for image in &images {
            let key = image.to_string_lossy().into_owned();
            match Self::ocr_image(image).await {
                Ok(text) => {
                    results.insert(key, text);
                }
                Err(e) => {
                    // Per-image leniency: one bad page must not lose the
                    // rest of the document.
                    warn!("OCR failed for {}: {e}", image.display());
                    results.insert(key, format!("ERROR: {e}"));
                }
            }
        }

        Ok(results)
    }
}
