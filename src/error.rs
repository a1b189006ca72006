//! Error types for the fliprisk library.
//!
//! Two types cover the two places a run can go wrong:
//!
//! * [`AnalyzerError`] — **Fatal**: the run stops (no credential, a file type
//!   we cannot route, a PDF pdfium cannot open, the remote call failed).
//!   Returned as `Err(AnalyzerError)` from every public entry point.
//!
//! * [`AnalysisFailure`] — the reason a remote completion failed. It is
//!   produced by [`crate::pipeline::llm::CompletionClient`] implementations
//!   and wrapped into [`AnalyzerError::AnalysisRequestFailed`] by the pipeline.
//!
//! Nothing is retried. Every error is terminal for the current upload and
//! the caller decides how to surface it.

use edgequake_llm::LlmError;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the fliprisk library.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    // ── Session errors ────────────────────────────────────────────────────
    /// No API key was supplied for the default backend.
    #[error("No API key supplied.\nPass --api-key or set OPENAI_API_KEY for this session.")]
    MissingCredential,

    // ── Input errors ──────────────────────────────────────────────────────
    /// The declared MIME type is not one of PDF, PNG, JPG or JPEG.
    #[error("Unsupported file type '{mime_type}'. Upload a PDF, PNG, JPG or JPEG file.")]
    UnsupportedFileType { mime_type: String },

    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Any other I/O failure while reading the upload.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// pdfium could not parse the document.
    #[error("PDF '{filename}' is corrupt: {detail}")]
    CorruptPdf { filename: String, detail: String },

    /// The PDF is encrypted; uploads carry no password.
    #[error("PDF '{filename}' is encrypted and cannot be read without a password.")]
    PasswordRequired { filename: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Install libpdfium or point --pdfium-lib / PDFIUM_LIB_PATH at an existing copy."
    )]
    PdfiumBindingFailed(String),

    /// The image bytes could not be decoded as the declared format.
    #[error("Could not decode image '{filename}': {detail}")]
    ImageDecodeFailed { filename: String, detail: String },

    /// The OCR engine could not be started at all.
    #[error("OCR engine '{command}' is not available: {detail}\nInstall tesseract-ocr or pass --tesseract <PATH>.")]
    OcrUnavailable { command: String, detail: String },

    /// The OCR engine ran but reported failure.
    #[error("OCR failed: {detail}")]
    OcrFailed { detail: String },

    /// Extraction produced no usable text and the empty-text policy rejects it.
    #[error("No text could be extracted from '{filename}'; refusing to send an empty document for analysis.")]
    ExtractionProducedEmptyText { filename: String },

    // ── Analysis errors ───────────────────────────────────────────────────
    /// The remote completion call failed.
    #[error("Analysis request failed: {0}")]
    AnalysisRequestFailed(#[from] AnalysisFailure),

    /// A named provider could not be initialised (missing key, unknown name).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a completion request did not produce an analysis.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisFailure {
    /// The request never got a response (DNS, TLS, connection refused or reset).
    #[error("network error: {0}")]
    Network(String),

    /// No response within the configured request timeout.
    #[error("request timed out")]
    Timeout,

    /// The endpoint rejected the credential.
    #[error("authentication rejected: {message}")]
    Authentication { message: String },

    /// The endpoint is throttling this key.
    #[error("rate limited: {message}")]
    RateLimited { message: String },

    /// Any other error reported by the endpoint, including a reply without choices.
    #[error("API error: {message}")]
    Api { message: String },

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Any other provider failure (configuration, unsupported request, ...).
    #[error("provider '{provider}' failed: {detail}")]
    Provider { provider: String, detail: String },
}

impl AnalysisFailure {
    /// Classify an `edgequake-llm` error raised by `provider`.
    ///
    /// OpenAI-compatible endpoints report a rejected key as a plain API error
    /// ("Incorrect API key provided"), so API messages are checked for
    /// credential wording as well.
    pub fn from_llm_error(provider: &str, err: LlmError) -> Self {
        match err {
            LlmError::AuthError(message) => AnalysisFailure::Authentication { message },
            LlmError::RateLimited(message) => AnalysisFailure::RateLimited { message },
            LlmError::NetworkError(detail) => AnalysisFailure::Network(detail),
            LlmError::Timeout => AnalysisFailure::Timeout,
            LlmError::SerializationError(e) => AnalysisFailure::MalformedResponse(e.to_string()),
            LlmError::ApiError(message) if mentions_credential(&message) => {
                AnalysisFailure::Authentication { message }
            }
            LlmError::ApiError(message) => AnalysisFailure::Api { message },
            other => AnalysisFailure::Provider {
                provider: provider.to_string(),
                detail: other.to_string(),
            },
        }
    }
}

fn mentions_credential(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["api key", "api_key", "unauthorized", "authentication"]
        .iter()
        .any(|needle| lower.contains(needle))
}
