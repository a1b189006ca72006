//! PDF text extraction via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and must not be driven from an async worker thread. The whole
//! document is opened, read and dropped inside one blocking task.
//!
//! Pages are read in order, one after another. A page whose text layer is
//! empty (a scanned page, a blank separator) contributes nothing; there is
//! no OCR fallback for such pages.

use crate::error::AnalyzerError;
use crate::output::{ExtractedText, PageCounts};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Extract the embedded text layer of every page.
pub async fn extract_pdf_text(
    bytes: Vec<u8>,
    filename: String,
    pdfium_lib_path: Option<PathBuf>,
) -> Result<ExtractedText, AnalyzerError> {
    tokio::task::spawn_blocking(move || {
        extract_pdf_text_blocking(&bytes, &filename, pdfium_lib_path.as_deref())
    })
    .await
    .map_err(|e| AnalyzerError::Internal(format!("PDF extraction task panicked: {}", e)))?
}

/// Blocking implementation of PDF text extraction.
fn extract_pdf_text_blocking(
    bytes: &[u8],
    filename: &str,
    pdfium_lib_path: Option<&Path>,
) -> Result<ExtractedText, AnalyzerError> {
    let pdfium = bind_pdfium(pdfium_lib_path)?;

    let document = pdfium.load_pdf_from_byte_slice(bytes, None).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            AnalyzerError::PasswordRequired {
                filename: filename.to_string(),
            }
        } else {
            AnalyzerError::CorruptPdf {
                filename: filename.to_string(),
                detail: err_str,
            }
        }
    })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut page_texts = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        match page.text() {
            Ok(text) => {
                let text = text.all();
                debug!("Page {}: {} chars", idx + 1, text.len());
                page_texts.push(Some(text));
            }
            Err(e) => {
                warn!("Page {}: no readable text layer ({:?})", idx + 1, e);
                page_texts.push(None);
            }
        }
    }

    Ok(join_page_texts(page_texts))
}

/// Bind pdfium from an explicit path, or fall back to the system library.
fn bind_pdfium(lib_path: Option<&Path>) -> Result<Pdfium, AnalyzerError> {
    let bindings = match lib_path {
        Some(path) => Pdfium::bind_to_library(path),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| AnalyzerError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Assemble per-page results into one text, in page order.
///
/// Every page that produced a non-empty string is appended followed by a
/// single `\n`. Pages that produced nothing (`None` or `""`) are dropped
/// without a placeholder. pdfium separates lines with `\r\n`; those become
/// `\n` so the text is the same on every platform.
pub fn join_page_texts<I>(pages: I) -> ExtractedText
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut text = String::new();
    let mut total = 0;
    let mut with_text = 0;

    for page in pages {
        total += 1;
        match page {
            Some(t) if !t.is_empty() => {
                text.push_str(&normalize_line_breaks(&t));
                text.push('\n');
                with_text += 1;
            }
            _ => {}
        }
    }

    if with_text < total {
        debug!("{} of {} pages had no text layer", total - with_text, total);
    }

    ExtractedText {
        text,
        pages: Some(PageCounts { total, with_text }),
    }
}

/// `\r\n` and lone `\r` → `\n`.
fn normalize_line_breaks(page: &str) -> String {
    page.replace("\r\n", "\n").replace('\r', "\n")
}
