//! Progress-callback trait for pipeline stage events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::AnalysisConfigBuilder::progress_callback`] to hear about
//! each stage as a run moves through it. The CLI uses this to drive its
//! "Extracting text…" and "Analyzing…" spinners.
//!
//! # Example
//!
//! ```rust
//! use fliprisk::{AnalysisConfig, PipelineProgressCallback};
//! use std::sync::Arc;
//!
//! struct Log;
//!
//! impl PipelineProgressCallback for Log {
//!     fn on_analysis_start(&self, prompt_chars: usize) {
//!         eprintln!("sending {prompt_chars} chars");
//!     }
//! }
//!
//! let config = AnalysisConfig::builder()
//!     .progress_callback(Arc::new(Log) as Arc<dyn PipelineProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::ExtractedText;
use crate::upload::DocumentKind;
use std::sync::Arc;

/// Called by the pipeline at each stage boundary.
///
/// All methods default to no-ops so implementors override only what they
/// need. Events arrive in order on whichever thread drives the run.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called once the upload is in memory and routed, before extraction begins.
    fn on_extraction_start(&self, filename: &str, kind: DocumentKind) {
        let _ = (filename, kind);
    }

    /// Called once text extraction finished, before the empty-text policy
    /// is applied and before any remote call.
    ///
    /// `extracted` is the full text that will be embedded in the prompt;
    /// front-ends show their preview from here so it is visible even when
    /// the analysis later fails.
    fn on_extraction_complete(&self, extracted: &ExtractedText) {
        let _ = extracted;
    }

    /// Called just before the completion request is sent.
    fn on_analysis_start(&self, prompt_chars: usize) {
        let _ = prompt_chars;
    }

    /// Called when the completion arrived.
    fn on_analysis_complete(&self, analysis_chars: usize) {
        let _ = analysis_chars;
    }

    /// Called when the run stops with an error at any stage.
    fn on_failure(&self, error: &str) {
        let _ = error;
    }
}

/// No-op implementation; the default when nothing is configured.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Alias matching the type stored in [`crate::config::AnalysisConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;
