//! Configuration for an analysis run.
//!
//! Everything a run can vary lives in [`AnalysisConfig`], built via its
//! [`AnalysisConfigBuilder`]. The defaults reproduce the fixed behaviour of
//! the tool: `gpt-4o-mini`, temperature 0.2, the financial-analyst system
//! role, a 3000-character preview and no request timeout.
//!
//! The credential is deliberately **not** part of the config. It is a
//! per-session value passed straight into the client constructor.

use crate::error::AnalyzerError;
use crate::output::DEFAULT_PREVIEW_CHARS;
use crate::pipeline::ocr::OcrEngine;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default OpenAI-compatible API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Configuration for one upload → analysis run.
///
/// # Example
/// ```rust
/// use fliprisk::{AnalysisConfig, EmptyTextPolicy};
///
/// let config = AnalysisConfig::builder()
///     .model("gpt-4o")
///     .empty_text(EmptyTextPolicy::Reject)
///     .build()
///     .unwrap();
/// assert_eq!(config.temperature, 0.2);
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Chat model identifier. Default: `gpt-4o-mini`.
    pub model: String,

    /// Named `edgequake-llm` provider ("openai", "anthropic", "ollama", …).
    /// When set, the provider reads its own API key from the environment
    /// and the session credential is not used.
    pub provider_name: Option<String>,

    /// Pre-constructed provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Root of the OpenAI-compatible API for the default backend.
    pub base_url: String,

    /// Sampling temperature. Default: 0.2.
    pub temperature: f32,

    /// Completion length cap. Default: none (endpoint default).
    pub max_tokens: Option<usize>,

    /// System message override. If None, uses
    /// [`crate::prompts::DEFAULT_SYSTEM_PROMPT`].
    pub system_prompt: Option<String>,

    /// Whole-request timeout for the default backend. Default: none.
    pub request_timeout_secs: Option<u64>,

    /// What to do when extraction yields no text. Default: [`EmptyTextPolicy::Warn`].
    pub empty_text: EmptyTextPolicy,

    /// Characters shown in the extracted-text preview. Default: 3000.
    /// `0` disables the preview.
    pub preview_chars: usize,

    /// Tesseract executable. Default: `tesseract` on `PATH`.
    pub tesseract_cmd: PathBuf,

    /// Explicit libpdfium location. If None, binds the system library.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Pre-constructed OCR engine. Takes precedence over `tesseract_cmd`.
    pub ocr_engine: Option<Arc<dyn OcrEngine>>,

    /// Stage events receiver.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            provider_name: None,
            provider: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            system_prompt: None,
            request_timeout_secs: None,
            empty_text: EmptyTextPolicy::default(),
            preview_chars: DEFAULT_PREVIEW_CHARS,
            tesseract_cmd: PathBuf::from("tesseract"),
            pdfium_lib_path: None,
            ocr_engine: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("empty_text", &self.empty_text)
            .field("preview_chars", &self.preview_chars)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("ocr_engine", &self.ocr_engine.as_ref().map(|_| "<dyn OcrEngine>"))
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }

    /// True when the run goes through `edgequake-llm` rather than the
    /// built-in OpenAI client, i.e. no session credential is needed.
    pub fn uses_provider(&self) -> bool {
        self.provider.is_some() || self.provider_name.is_some()
    }
}

/// Builder for [`AnalysisConfig`].
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl fmt::Debug for AnalysisConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl AnalysisConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn empty_text(mut self, policy: EmptyTextPolicy) -> Self {
        self.config.empty_text = policy;
        self
    }

    pub fn preview_chars(mut self, n: usize) -> Self {
        self.config.preview_chars = n;
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<PathBuf>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn ocr_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.config.ocr_engine = Some(engine);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, AnalyzerError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(AnalyzerError::InvalidConfig("model must not be empty".into()));
        }
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(AnalyzerError::InvalidConfig(format!(
                "base URL must be http:// or https://, got '{}'",
                c.base_url
            )));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(AnalyzerError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        if c.max_tokens == Some(0) {
            return Err(AnalyzerError::InvalidConfig("max tokens must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How to treat an upload from which no text could be extracted.
///
/// Sending an empty document still costs a completion call and the model
/// will answer about nothing, so the default surfaces a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyTextPolicy {
    /// Send the empty prompt anyway, silently.
    Proceed,
    /// Log a warning, then send. (default)
    #[default]
    Warn,
    /// Stop with [`AnalyzerError::ExtractionProducedEmptyText`].
    Reject,
}
