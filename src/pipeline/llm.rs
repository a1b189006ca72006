//! Completion backend: send the prompt, get the analysis text back.
//!
//! [`CompletionClient`] is the seam the pipeline talks to. The production
//! implementation is [`ProviderClient`], a thin wrapper over an
//! `edgequake-llm` provider:
//!
//! * by default an OpenAI-compatible provider built from the session
//!   [`Credential`] and `config.base_url` ([`ProviderClient::openai_compatible`]);
//! * `--provider <name>`: any provider [`ProviderFactory`] knows (Anthropic,
//!   Gemini, Ollama, …), which resolves its own API key;
//! * a pre-built `Arc<dyn LLMProvider>` from the config.
//!
//! One request, one response, no streaming. Whatever text the model returns
//! is passed through, including an empty string.

use crate::config::AnalysisConfig;
use crate::credential::Credential;
use crate::error::{AnalysisFailure, AnalyzerError};
use crate::prompts::DEFAULT_SYSTEM_PROMPT;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, OpenAIProvider, ProviderFactory};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Everything a backend needs for one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    /// System-role message.
    pub system: String,
    /// User-role message: the full prompt.
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: Option<usize>,
}

impl ChatRequest {
    /// Build the request for `prompt` from the run configuration.
    pub fn from_config(prompt: String, config: &AnalysisConfig) -> Self {
        Self {
            model: config.model.clone(),
            system: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            prompt,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// The first completion returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub input_tokens: Option<usize>,
    pub output_tokens: Option<usize>,
}

/// A chat-completion backend.
pub trait CompletionClient: Send + Sync {
    /// Send one request and await the whole response.
    fn complete<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> BoxFuture<'a, Result<Completion, AnalysisFailure>>;
}

impl<C: CompletionClient + ?Sized> CompletionClient for Arc<C> {
    fn complete<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> BoxFuture<'a, Result<Completion, AnalysisFailure>> {
        (**self).complete(request)
    }
}

// ── edgequake-llm provider backend ───────────────────────────────────────

/// A completion backend backed by an `edgequake-llm` provider.
pub struct ProviderClient {
    provider: Arc<dyn LLMProvider>,
    label: String,
    timeout: Option<Duration>,
}

impl ProviderClient {
    /// Wrap an already-configured provider.
    pub fn new(provider: Arc<dyn LLMProvider>, label: impl Into<String>) -> Self {
        Self {
            provider,
            label: label.into(),
            timeout: None,
        }
    }

    /// Bound the whole call, including any backoff the provider does.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// OpenAI-compatible provider authenticated with the session credential.
    ///
    /// The key is copied into the provider and lives exactly as long as
    /// this client.
    pub fn openai_compatible(credential: &Credential, config: &AnalysisConfig) -> Self {
        let provider = OpenAIProvider::compatible(credential.expose(), config.base_url.as_str())
            .with_model(config.model.as_str());
        Self::new(Arc::new(provider), "openai")
            .with_timeout(config.request_timeout_secs.map(Duration::from_secs))
    }

    /// Instantiate a named provider through [`ProviderFactory`].
    pub fn from_name(name: &str, model: &str) -> Result<Self, AnalyzerError> {
        let provider = ProviderFactory::create_llm_provider(name, model).map_err(|e| {
            AnalyzerError::ProviderNotConfigured {
                provider: name.to_string(),
                hint: format!("{e}"),
            }
        })?;
        Ok(Self::new(provider, name))
    }

    /// Name used in logs and provider errors.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("label", &self.label)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl CompletionClient for ProviderClient {
    fn complete<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> BoxFuture<'a, Result<Completion, AnalysisFailure>> {
        Box::pin(async move {
            let messages = vec![
                ChatMessage::system(request.system.as_str()),
                ChatMessage::user(request.prompt.as_str()),
            ];
            let options = CompletionOptions {
                temperature: Some(request.temperature),
                max_tokens: request.max_tokens,
                ..Default::default()
            };
            debug!(
                "{}: model={} prompt={} chars",
                self.label,
                request.model,
                request.prompt.len()
            );

            let call = self.provider.chat(&messages, Some(&options));
            let result = match self.timeout {
                Some(limit) => tokio::time::timeout(limit, call)
                    .await
                    .map_err(|_| AnalysisFailure::Timeout)?,
                None => call.await,
            };
            let response =
                result.map_err(|e| AnalysisFailure::from_llm_error(&self.label, e))?;

            Ok(Completion {
                content: response.content,
                input_tokens: Some(response.prompt_tokens),
                output_tokens: Some(response.completion_tokens),
            })
        })
    }
}

// ── Backend resolution ───────────────────────────────────────────────────

/// Pick the backend for this run, from most-specific to least-specific:
///
/// 1. **Pre-built provider** (`config.provider`)
/// 2. **Named provider** (`config.provider_name`) via [`ProviderFactory`]
/// 3. **OpenAI-compatible endpoint** with the session credential; a missing
///    credential is [`AnalyzerError::MissingCredential`].
pub fn resolve_client(
    config: &AnalysisConfig,
    credential: Option<Credential>,
) -> Result<Arc<dyn CompletionClient>, AnalyzerError> {
    let timeout = config.request_timeout_secs.map(Duration::from_secs);

    if let Some(ref provider) = config.provider {
        info!("Using pre-configured LLM provider");
        let client = ProviderClient::new(Arc::clone(provider), "custom").with_timeout(timeout);
        return Ok(Arc::new(client));
    }

    if let Some(ref name) = config.provider_name {
        info!("Using provider '{}' with model '{}'", name, config.model);
        let client = ProviderClient::from_name(name, &config.model)?.with_timeout(timeout);
        return Ok(Arc::new(client));
    }

    let credential = credential.ok_or(AnalyzerError::MissingCredential)?;
    info!("Using {} with model '{}'", config.base_url, config.model);
    Ok(Arc::new(ProviderClient::openai_compatible(&credential, config)))
}
