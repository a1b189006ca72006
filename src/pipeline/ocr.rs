//! OCR: recover text from a decoded image.
//!
//! [`OcrEngine`] is the seam; [`TesseractCli`] is the default engine. It runs
//! the `tesseract` executable in its default configuration (no language
//! hint, no page-segmentation override, no pre-processing) and returns its
//! stdout unchanged.

use crate::error::AnalyzerError;
use crate::pipeline::image::encode_png;
use image::DynamicImage;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

/// Something that turns pixels into text.
///
/// Implementations are called from a blocking thread and may block.
pub trait OcrEngine: Send + Sync {
    /// Recognise text in `image`. The returned string is used as-is.
    fn recognize(&self, image: &DynamicImage) -> Result<String, AnalyzerError>;
}

/// Tesseract invoked as an external process: `tesseract <image> stdout`.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: PathBuf,
}

impl TesseractCli {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image: &DynamicImage) -> Result<String, AnalyzerError> {
        let png = encode_png(image).map_err(|e| AnalyzerError::OcrFailed {
            detail: format!("could not encode image for tesseract: {e}"),
        })?;

        // Removed when `tmp` drops at the end of this call.
        let mut tmp = tempfile::Builder::new()
            .prefix("fliprisk-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| AnalyzerError::Internal(format!("tempfile: {e}")))?;
        tmp.write_all(&png)
            .and_then(|_| tmp.flush())
            .map_err(|e| AnalyzerError::Internal(format!("tempfile write: {e}")))?;

        debug!("Running {} on {} byte PNG", self.command.display(), png.len());

        let output = Command::new(&self.command)
            .arg(tmp.path())
            .arg("stdout")
            .output()
            .map_err(|e| AnalyzerError::OcrUnavailable {
                command: self.command.display().to_string(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnalyzerError::OcrFailed {
                detail: format!("{} exited with {}: {}", self.command.display(), output.status, stderr.trim()),
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!("tesseract: {}", stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
