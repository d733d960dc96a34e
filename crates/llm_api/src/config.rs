use std::time::Duration;

/// Transport configuration for provider requests.
#[derive(Debug, Clone, Default)]
pub struct LlmApiConfig {
    /// Provider API key; sent as `x-goog-api-key` or a bearer token depending on wire format.
    pub api_key: String,
    /// Optional request timeout.
    pub timeout: Option<Duration>,
}

impl LlmApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
