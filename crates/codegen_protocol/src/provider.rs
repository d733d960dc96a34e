use std::fmt;

use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::action::ActionRecord;
use crate::execution::ExecutionSession;

/// Lazy, finite, non-restartable sequence of action records for one call.
pub type ActionStream = BoxStream<'static, ActionRecord>;

/// Error returned while constructing a provider before any call starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInitError {
    message: String,
}

impl ProviderInitError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ProviderInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProviderInitError {}

impl From<String> for ProviderInitError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ProviderInitError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Provider-neutral conversation history item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: Role,
    pub text: String,
}

impl HistoryTurn {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Immutable metadata describing a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider_id: String,
    pub model_id: String,
}

/// Capability interface implemented by every provider adapter.
pub trait GenerationProvider: Send + Sync + 'static {
    /// Returns provider/model identity metadata.
    fn profile(&self) -> ProviderProfile;

    /// Opens one generation call.
    ///
    /// `history` excludes `prompt`. The returned stream suspends while the
    /// transport is silent and ends after the transport completes. Transport
    /// failures end it with exactly one classified `Error` record. Dropping
    /// the stream aborts the transport.
    fn stream_generation(&self, history: &[HistoryTurn], prompt: &str) -> ActionStream;

    /// Starts a code-execution chat session.
    ///
    /// Providers return an error when code execution is unsupported.
    fn start_execution_session(&self) -> Result<Box<dyn ExecutionSession>, String> {
        Err("Code execution is not supported by this provider".to_string())
    }
}
