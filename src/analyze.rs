//! Pipeline entry points: upload → extract → prompt → analysis.
//!
//! [`process`] is the core: one upload, one completion client, one report.
//! [`analyze`] resolves the client from the config and session credential
//! first, so a missing key stops the run before the file is even opened.
//! The `*_file` variants read the upload from disk; [`analyze_sync`] wraps
//! everything for callers without a tokio runtime.

use crate::config::{AnalysisConfig, EmptyTextPolicy};
use crate::credential::Credential;
use crate::error::AnalyzerError;
use crate::output::{AnalysisReport, AnalysisStats, ExtractedText};
use crate::pipeline::image::decode_image;
use crate::pipeline::llm::{resolve_client, ChatRequest, CompletionClient};
use crate::pipeline::ocr::{OcrEngine, TesseractCli};
use crate::pipeline::{input, pdf};
use crate::prompts::build_prompt;
use crate::upload::{DocumentKind, Upload};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Analyse one upload with the backend chosen by `config`.
///
/// This is the whole pipeline as a single call. The credential is used only
/// by the default OpenAI-compatible backend and is dropped when the call
/// returns.
///
/// # Errors
/// - [`AnalyzerError::MissingCredential`] before any processing when the
///   default backend is selected and no credential was supplied
/// - [`AnalyzerError::UnsupportedFileType`] before extraction
/// - extraction errors (corrupt PDF, undecodable image, OCR failure)
/// - [`AnalyzerError::ExtractionProducedEmptyText`] under
///   [`EmptyTextPolicy::Reject`]
/// - [`AnalyzerError::AnalysisRequestFailed`] for any remote failure
pub async fn analyze(
    upload: Upload,
    credential: Option<Credential>,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalyzerError> {
    let client = resolve_client(config, credential)?;
    process(upload, client.as_ref(), config).await
}

/// Read `path` and analyse it.
///
/// The credential check happens before the file is read.
pub async fn analyze_file(
    path: impl AsRef<Path>,
    mime_override: Option<&str>,
    credential: Option<Credential>,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalyzerError> {
    let client = resolve_client(config, credential)?;
    let upload = input::read_upload(path.as_ref(), mime_override).await?;
    process(upload, client.as_ref(), config).await
}

/// Synchronous wrapper around [`analyze`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_sync(
    upload: Upload,
    credential: Option<Credential>,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalyzerError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| AnalyzerError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(analyze(upload, credential, config))
}

/// Run the pipeline against an explicit completion client.
///
/// Stages run strictly in sequence. The client is invoked at most once and
/// never when routing or extraction fails.
pub async fn process(
    upload: Upload,
    client: &dyn CompletionClient,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalyzerError> {
    let result = process_inner(upload, client, config).await;
    if let (Err(e), Some(cb)) = (&result, &config.progress_callback) {
        cb.on_failure(&e.to_string());
    }
    result
}

async fn process_inner(
    upload: Upload,
    client: &dyn CompletionClient,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalyzerError> {
    let total_start = Instant::now();

    // ── Step 1: Route ────────────────────────────────────────────────────
    let kind = upload.kind()?;
    let filename = upload.filename.clone();
    let mime_type = upload.mime_type.clone();
    info!("Processing: {} ({:?})", filename, kind);

    // ── Step 2: Extract ──────────────────────────────────────────────────
    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_start(&filename, kind);
    }
    let extraction_start = Instant::now();
    let extracted = extract_text(upload, kind, config).await?;
    let extraction_duration_ms = extraction_start.elapsed().as_millis() as u64;
    let extracted_chars = extracted.char_count();
    info!(
        "Extracted {} chars in {}ms",
        extracted_chars, extraction_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_complete(&extracted);
    }

    if extracted.is_blank() {
        match config.empty_text {
            EmptyTextPolicy::Proceed => {}
            EmptyTextPolicy::Warn => {
                warn!("No text extracted from '{}'; sending it for analysis anyway", filename)
            }
            EmptyTextPolicy::Reject => {
                return Err(AnalyzerError::ExtractionProducedEmptyText { filename });
            }
        }
    }

    // ── Step 3: Build prompt ─────────────────────────────────────────────
    let prompt = build_prompt(&extracted.text);
    let prompt_chars = prompt.chars().count();
    let request = ChatRequest::from_config(prompt, config);
    debug!("Prompt is {} chars", prompt_chars);

    // ── Step 4: Analyse ──────────────────────────────────────────────────
    if let Some(ref cb) = config.progress_callback {
        cb.on_analysis_start(prompt_chars);
    }
    let analysis_start = Instant::now();
    let completion = client.complete(&request).await?;
    let analysis_duration_ms = analysis_start.elapsed().as_millis() as u64;
    info!(
        "Analysis received: {} chars in {}ms",
        completion.content.len(),
        analysis_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_analysis_complete(completion.content.chars().count());
    }

    let stats = AnalysisStats {
        extracted_chars,
        prompt_chars,
        input_tokens: completion.input_tokens,
        output_tokens: completion.output_tokens,
        extraction_duration_ms,
        analysis_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    Ok(AnalysisReport {
        filename,
        mime_type,
        kind,
        extracted_text: extracted,
        analysis: completion.content,
        stats,
    })
}

/// Extract text only. Needs no credential and makes no network call.
pub async fn extract(upload: Upload, config: &AnalysisConfig) -> Result<ExtractedText, AnalyzerError> {
    let kind = upload.kind()?;
    extract_text(upload, kind, config).await
}

/// Read `path` and extract its text.
pub async fn extract_file(
    path: impl AsRef<Path>,
    mime_override: Option<&str>,
    config: &AnalysisConfig,
) -> Result<ExtractedText, AnalyzerError> {
    let upload = input::read_upload(path.as_ref(), mime_override).await?;
    extract(upload, config).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Dispatch to the PDF or OCR path.
async fn extract_text(
    upload: Upload,
    kind: DocumentKind,
    config: &AnalysisConfig,
) -> Result<ExtractedText, AnalyzerError> {
    let Upload {
        filename, bytes, ..
    } = upload;

    match kind {
        DocumentKind::Pdf => {
            pdf::extract_pdf_text(bytes, filename, config.pdfium_lib_path.clone()).await
        }
        DocumentKind::Png | DocumentKind::Jpeg => {
            let engine = resolve_ocr_engine(config);
            tokio::task::spawn_blocking(move || {
                let image = decode_image(&bytes, &filename)?;
                engine.recognize(&image).map(ExtractedText::from_ocr)
            })
            .await
            .map_err(|e| AnalyzerError::Internal(format!("OCR task panicked: {}", e)))?
        }
    }
}

/// Pre-built engine if configured, otherwise Tesseract.
fn resolve_ocr_engine(config: &AnalysisConfig) -> Arc<dyn OcrEngine> {
    match config.ocr_engine {
        Some(ref engine) => Arc::clone(engine),
        None => Arc::new(TesseractCli::new(config.tesseract_cmd.clone())),
    }
}
