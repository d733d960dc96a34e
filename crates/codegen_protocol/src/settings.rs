use std::fmt;

use serde::{Deserialize, Serialize};

/// Default model used when settings do not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Wire format spoken by a provider's streaming endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireFormat {
    /// Gemini SSE stream of typed chunks, each carrying its text directly.
    GeminiSdk,
    /// Gemini REST stream: a JSON array of `GenerateContentResponse` envelopes.
    GeminiRest,
    /// OpenAI-compatible chat-completions SSE stream of delta envelopes.
    OpenAiCompatible,
}

/// Supported model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    Google,
    AvalAI,
    GapGPT,
    TalkBot,
}

impl ProviderKind {
    pub const ALL: [Self; 4] = [Self::Google, Self::AvalAI, Self::GapGPT, Self::TalkBot];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::AvalAI => "AvalAI",
            Self::GapGPT => "GapGPT",
            Self::TalkBot => "TalkBot",
        }
    }

    /// Case-insensitive lookup by provider name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
    }

    #[must_use]
    pub fn wire_format(&self) -> WireFormat {
        match self {
            Self::Google => WireFormat::GeminiSdk,
            Self::AvalAI => WireFormat::GeminiRest,
            Self::GapGPT | Self::TalkBot => WireFormat::OpenAiCompatible,
        }
    }

    /// Code execution is only offered through the Gemini SDK-style transport.
    #[must_use]
    pub fn supports_code_execution(&self) -> bool {
        matches!(self.wire_format(), WireFormat::GeminiSdk)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider selection persisted by the settings collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProviderSettings {
    pub provider: ProviderKind,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Overrides the provider's default endpoint base.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Request timeout in seconds; must be positive when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_sec: Option<u64>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_owned()
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Google,
            api_key: String::new(),
            model: default_model(),
            base_url: None,
            timeout_sec: None,
        }
    }
}

impl ProviderSettings {
    #[must_use]
    pub fn new(provider: ProviderKind, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            timeout_sec: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Model id with surrounding whitespace removed, or the default model.
    #[must_use]
    pub fn model_id(&self) -> &str {
        let trimmed = self.model.trim();
        if trimmed.is_empty() {
            DEFAULT_MODEL
        } else {
            trimmed
        }
    }
}
