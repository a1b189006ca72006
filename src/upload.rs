//! The uploaded document and the MIME routing that decides how to read it.

use crate::error::AnalyzerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// One uploaded file: raw bytes plus what the uploader claims it is.
///
/// Consumed once by the extractor and then dropped.
#[derive(Clone)]
pub struct Upload {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Route this upload to an extraction path.
    pub fn kind(&self) -> Result<DocumentKind, AnalyzerError> {
        DocumentKind::from_mime(&self.mime_type)
    }
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

/// The extraction path an upload takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Paginated document with (possibly) an embedded text layer.
    Pdf,
    /// Raster image read by OCR.
    Png,
    /// Raster image read by OCR.
    Jpeg,
}

impl DocumentKind {
    /// Route by declared MIME type.
    ///
    /// Matching is a case-insensitive substring test: anything mentioning
    /// `pdf` is a PDF, then `png`, then `jpeg`/`jpg`. Everything else is
    /// [`AnalyzerError::UnsupportedFileType`].
    pub fn from_mime(mime_type: &str) -> Result<Self, AnalyzerError> {
        let m = mime_type.trim().to_ascii_lowercase();
        if m.contains("pdf") {
            Ok(DocumentKind::Pdf)
        } else if m.contains("png") {
            Ok(DocumentKind::Png)
        } else if m.contains("jpeg") || m.contains("jpg") {
            Ok(DocumentKind::Jpeg)
        } else {
            Err(AnalyzerError::UnsupportedFileType {
                mime_type: mime_type.to_string(),
            })
        }
    }

    /// True for the OCR path.
    pub fn is_image(self) -> bool {
        matches!(self, DocumentKind::Png | DocumentKind::Jpeg)
    }

    /// Canonical MIME type for this kind.
    pub fn mime_type(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Png => "image/png",
            DocumentKind::Jpeg => "image/jpeg",
        }
    }
}

/// Guess the declared MIME type from a file extension, the way a browser
/// upload widget would. Unknown extensions fall back to
/// `application/octet-stream`, which the router rejects.
pub fn mime_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
