use std::fmt;

use codegen_protocol::ProviderFailure;
use reqwest::StatusCode;
use serde_json::Error as JsonError;

#[derive(Debug)]
pub enum LlmApiError {
    MissingApiKey,
    InvalidHeader(String),
    Request(reqwest::Error),
    Status { status: StatusCode, body: String },
    Serde(JsonError),
    RetryExhausted {
        status: Option<StatusCode>,
        last_error: Option<String>,
    },
}

impl LlmApiError {
    /// Raw failure handed to the classifier.
    pub fn to_failure(&self) -> ProviderFailure {
        match self {
            Self::Status { status, body } => ProviderFailure::http(status.as_u16(), body),
            Self::RetryExhausted {
                status: Some(status),
                last_error,
            } => ProviderFailure::http(status.as_u16(), last_error.as_deref().unwrap_or("")),
            Self::MissingApiKey => ProviderFailure::Text(self.to_string()),
            other => ProviderFailure::Exception(other.to_string()),
        }
    }
}

impl fmt::Display for LlmApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "API key is not configured"),
            Self::InvalidHeader(message) => write!(f, "invalid header: {message}"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status { status, body } => {
                if body.trim().is_empty() {
                    write!(f, "HTTP {status}")
                } else {
                    write!(f, "HTTP {status} {}", body.trim())
                }
            }
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::RetryExhausted { status, last_error } => {
                let status = status
                    .map(|status| status.as_u16().to_string())
                    .unwrap_or_else(|| "n/a".to_owned());
                let last_error = last_error.as_deref().unwrap_or("none");
                write!(
                    f,
                    "retry exhausted after max attempts (status: {status}, last error: {last_error})"
                )
            }
        }
    }
}

impl std::error::Error for LlmApiError {}

impl From<reqwest::Error> for LlmApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for LlmApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}
