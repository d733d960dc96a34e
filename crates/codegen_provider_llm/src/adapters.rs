//! Concrete adapters, one per wire format.

use std::sync::Arc;

use codegen_protocol::{
    ActionStream, ExecutionSession, GenerationProvider, HistoryTurn, ProviderKind,
    ProviderProfile, ProviderSettings, WireFormat,
};
use futures_util::future::{self, FutureExt};
use llm_api::{
    default_base_url, delta_decoder, gemini_stream_url, normalize_chat_completions_url,
    ChatCompletionRequest, GeminiRequest, LlmApiError,
};
use serde::Serialize;

use crate::execution::GeminiExecutionSession;
use crate::instructions::SYSTEM_INSTRUCTIONS;
use crate::pipeline::action_stream;
use crate::transport::Transport;

/// Shared identity and endpoint of an adapter.
struct Endpoint {
    provider: ProviderKind,
    model: String,
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl Endpoint {
    fn new(settings: &ProviderSettings, transport: Arc<dyn Transport>) -> Self {
        let base_url = settings
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default_base_url(settings.provider))
            .to_owned();
        Self {
            provider: settings.provider,
            model: settings.model_id().to_owned(),
            base_url,
            transport,
        }
    }

    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: self.provider.as_str().to_owned(),
            model_id: self.model.clone(),
        }
    }

    fn stream<R: Serialize>(&self, wire: WireFormat, url: String, request: &R) -> ActionStream {
        let opening = match serde_json::to_value(request) {
            Ok(body) => self.transport.open_stream(wire, url, body),
            Err(error) => future::ready(Err(LlmApiError::from(error))).boxed(),
        };
        action_stream(opening, delta_decoder(wire))
    }
}

/// Gemini through its SSE streaming endpoint; the only adapter with code execution.
pub struct GeminiSdkProvider {
    endpoint: Endpoint,
}

impl GeminiSdkProvider {
    pub fn new(settings: &ProviderSettings, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: Endpoint::new(settings, transport),
        }
    }
}

impl GenerationProvider for GeminiSdkProvider {
    fn profile(&self) -> ProviderProfile {
        self.endpoint.profile()
    }

    fn stream_generation(&self, history: &[HistoryTurn], prompt: &str) -> ActionStream {
        let url = gemini_stream_url(&self.endpoint.base_url, &self.endpoint.model, true);
        let request = GeminiRequest::generation(history, prompt, SYSTEM_INSTRUCTIONS);
        self.endpoint.stream(WireFormat::GeminiSdk, url, &request)
    }

    fn start_execution_session(&self) -> Result<Box<dyn ExecutionSession>, String> {
        let url = gemini_stream_url(&self.endpoint.base_url, &self.endpoint.model, true);
        Ok(Box::new(GeminiExecutionSession::new(
            url,
            Arc::clone(&self.endpoint.transport),
        )))
    }
}

/// Gemini-shaped REST endpoint streaming a JSON array of envelopes.
pub struct GeminiRestProvider {
    endpoint: Endpoint,
}

impl GeminiRestProvider {
    pub fn new(settings: &ProviderSettings, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: Endpoint::new(settings, transport),
        }
    }
}

impl GenerationProvider for GeminiRestProvider {
    fn profile(&self) -> ProviderProfile {
        self.endpoint.profile()
    }

    fn stream_generation(&self, history: &[HistoryTurn], prompt: &str) -> ActionStream {
        let url = gemini_stream_url(&self.endpoint.base_url, &self.endpoint.model, false);
        let request = GeminiRequest::generation(history, prompt, SYSTEM_INSTRUCTIONS);
        self.endpoint.stream(WireFormat::GeminiRest, url, &request)
    }
}

/// OpenAI-compatible `chat/completions` endpoint streaming SSE deltas.
pub struct OpenAiCompatProvider {
    endpoint: Endpoint,
}

impl OpenAiCompatProvider {
    pub fn new(settings: &ProviderSettings, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: Endpoint::new(settings, transport),
        }
    }
}

impl GenerationProvider for OpenAiCompatProvider {
    fn profile(&self) -> ProviderProfile {
        self.endpoint.profile()
    }

    fn stream_generation(&self, history: &[HistoryTurn], prompt: &str) -> ActionStream {
        let url = normalize_chat_completions_url(&self.endpoint.base_url);
        let request = ChatCompletionRequest::generation(
            self.endpoint.model.clone(),
            history,
            prompt,
            SYSTEM_INSTRUCTIONS,
        );
        self.endpoint.stream(WireFormat::OpenAiCompatible, url, &request)
    }
}
