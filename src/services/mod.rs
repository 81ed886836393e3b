//! Document services: the external capabilities the pipeline runner may
//! dispatch to.
//!
//! The registry is a *closed* set — [`ServiceKind`] enumerates every
//! service a step may name, and an unrecognised name is an explicit
//! configuration error rather than a lookup miss. The capabilities
//! themselves live behind the [`DocumentServices`] trait so the runner
//! never knows whether it is talking to Poppler subprocesses
//! ([`LocalToolchain`]) or an in-memory test double.

pub mod poppler;

use crate::error::DocuflowError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub use poppler::LocalToolchain;

/// Every service a pipeline step may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    /// Convert a PDF into page images.
    PdfToImage,
    /// Convert a PDF into page images, then OCR each image.
    PdfToText,
}

impl ServiceKind {
    /// Parse a step's service name; used by the runner so the error can
    /// carry the step id.
    pub(crate) fn parse(step: &str, name: &str) -> Result<Self, DocuflowError> {
        name.parse().map_err(|_| DocuflowError::UnknownService {
            step: step.to_string(),
            name: name.to_string(),
        })
    }
}

impl FromStr for ServiceKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdfToImage" => Ok(ServiceKind::PdfToImage),
            "pdfToText" => Ok(ServiceKind::PdfToText),
            _ => Err(()),
        }
    }
}

/// The document-processing capabilities behind the registry.
#[async_trait]
pub trait DocumentServices: Send + Sync {
    /// Convert a PDF into one image per page.
    ///
    /// Returns image paths in sorted, deterministic order.
    async fn pdf_to_image(
        &self,
        input_path: &Path,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>, DocuflowError>;

    /// Convert a PDF to images, then extract text from each image.
    ///
    /// Returns a mapping image-path → text. A single image failing OCR is
    /// recorded as an `"ERROR: <message>"` value for that key and does not
    /// abort sibling images; only the up-front conversion failing aborts
    /// the call. This per-item leniency is intentionally looser than the
    /// run-level strictness everywhere else.
    async fn pdf_to_text(
        &self,
        input_path: &Path,
        out_dir: &Path,
    ) -> Result<BTreeMap<String, String>, DocuflowError>;
}
