//! Session-scoped API credential.
//!
//! A [`Credential`] is created once per session from whatever the user typed
//! or exported, handed to [`crate::pipeline::llm::ProviderClient::openai_compatible`],
//! and dropped with the client. It is never stored globally, never serialised and
//! never printed: `Debug` renders a redacted placeholder.

use crate::error::AnalyzerError;
use std::fmt;

/// A bearer API key held in memory for one session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a key, rejecting empty or whitespace-only input.
    pub fn new(key: impl Into<String>) -> Result<Self, AnalyzerError> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(AnalyzerError::MissingCredential);
        }
        Ok(Self(key))
    }

    /// Build a credential from an optional key, treating `None` as missing.
    pub fn from_optional(key: Option<&str>) -> Result<Self, AnalyzerError> {
        match key {
            Some(k) => Self::new(k),
            None => Err(AnalyzerError::MissingCredential),
        }
    }

    /// The raw key. Only the completion backend should call this.
    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
