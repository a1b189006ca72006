//! Output types produced by a pipeline run.

use crate::upload::DocumentKind;
use serde::{Deserialize, Serialize};

/// Number of characters shown in the extracted-text preview.
pub const DEFAULT_PREVIEW_CHARS: usize = 3000;

/// Text recovered from an upload, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    /// Full extracted text. May be empty.
    pub text: String,
    /// Page counts for PDFs; `None` for images.
    pub pages: Option<PageCounts>,
}

impl ExtractedText {
    /// Text from an image: OCR output passed through unchanged.
    pub fn from_ocr(text: String) -> Self {
        Self { text, pages: None }
    }

    /// True when there is nothing worth sending to the model.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Character count (Unicode scalar values).
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// The first `max_chars` characters, for display only.
    pub fn preview(&self, max_chars: usize) -> &str {
        preview(&self.text, max_chars)
    }
}

/// Page bookkeeping for the PDF path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCounts {
    /// Pages in the document.
    pub total: usize,
    /// Pages that yielded non-empty text.
    pub with_text: usize,
}

/// The result of one upload → extract → prompt → analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub filename: String,
    pub mime_type: String,
    pub kind: DocumentKind,
    /// Full extracted text (not the preview).
    pub extracted_text: ExtractedText,
    /// The model's answer, verbatim.
    pub analysis: String,
    pub stats: AnalysisStats,
}

impl AnalysisReport {
    /// The first `max_chars` characters of the extracted text.
    pub fn preview(&self, max_chars: usize) -> &str {
        self.extracted_text.preview(max_chars)
    }
}

/// Timing and size figures for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub extracted_chars: usize,
    pub prompt_chars: usize,
    /// Prompt tokens, when the backend reports usage.
    pub input_tokens: Option<usize>,
    /// Completion tokens, when the backend reports usage.
    pub output_tokens: Option<usize>,
    pub extraction_duration_ms: u64,
    pub analysis_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Slice `text` to at most `max_chars` characters without splitting a
/// multi-byte character.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
