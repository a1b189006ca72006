//! # fliprisk
//!
//! Upload a financial document, get a structured risk analysis back.
//!
//! The crate extracts text from a PDF (embedded text layer, via pdfium) or an
//! image (OCR, via Tesseract), embeds it into a fixed eight-section analysis
//! prompt and sends it to a chat-completion model. The model's answer is
//! returned verbatim. All the analysis happens remotely; this crate is the
//! plumbing around it.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Upload (bytes + MIME type)
//!  │
//!  ├─ 1. Route    application/pdf → PDF path, image/png|jpeg → OCR path
//!  ├─ 2. Extract  per-page text layer (pdfium) or OCR (tesseract)
//!  ├─ 3. Prompt   fixed instructions + full extracted text
//!  ├─ 4. Analyse  one chat completion, temperature 0.2
//!  └─ 5. Report   analysis text + extracted text + stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fliprisk::{analyze_file, AnalysisConfig, Credential};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credential = Credential::new(std::env::var("OPENAI_API_KEY")?)?;
//!     let config = AnalysisConfig::default();
//!     let report = analyze_file("annual_report.pdf", None, Some(credential), &config).await?;
//!     println!("{}", report.analysis);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `fliprisk` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! ## Runtime requirements
//!
//! * libpdfium, either on the system library path or given explicitly via
//!   [`AnalysisConfig::pdfium_lib_path`]
//! * the `tesseract` executable for image uploads

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod credential;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod upload;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze, analyze_file, analyze_sync, extract, extract_file, process};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, EmptyTextPolicy};
pub use credential::Credential;
pub use error::{AnalysisFailure, AnalyzerError};
pub use output::{AnalysisReport, AnalysisStats, ExtractedText, PageCounts, DEFAULT_PREVIEW_CHARS};
pub use pipeline::llm::{ChatRequest, Completion, CompletionClient, ProviderClient};
pub use pipeline::ocr::{OcrEngine, TesseractCli};
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback};
pub use upload::{DocumentKind, Upload};
