//! LLM-backed implementations of the shared `GenerationProvider` contract.
//!
//! Each adapter turns one provider wire format into the lazy action-record
//! stream expected by `codegen_studio`. Selection is driven by
//! [`ProviderSettings`]; see [`provider_for_settings`].

pub mod adapters;
pub mod execution;
pub mod instructions;
pub mod pipeline;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use codegen_protocol::{GenerationProvider, ProviderInitError, ProviderSettings, WireFormat};
use llm_api::{LlmApiClient, LlmApiConfig};

pub use adapters::{GeminiRestProvider, GeminiSdkProvider, OpenAiCompatProvider};
pub use execution::GeminiExecutionSession;
pub use instructions::SYSTEM_INSTRUCTIONS;
pub use pipeline::action_stream;
pub use transport::{ClientTransport, Transport};

/// Builds the adapter for the configured provider over real HTTP transport.
pub fn provider_for_settings(
    settings: &ProviderSettings,
) -> Result<Arc<dyn GenerationProvider>, ProviderInitError> {
    let mut config = LlmApiConfig::new(settings.api_key.clone());
    if let Some(timeout_sec) = settings.timeout_sec.filter(|value| *value > 0) {
        config = config.with_timeout(Duration::from_secs(timeout_sec));
    }
    let client = LlmApiClient::new(config).map_err(|error| {
        ProviderInitError::new(format!(
            "Failed to initialize {} provider: {error}",
            settings.provider
        ))
    })?;

    Ok(provider_with_transport(
        settings,
        Arc::new(ClientTransport::new(client)),
    ))
}

/// Builds the adapter for the configured provider over `transport`.
pub fn provider_with_transport(
    settings: &ProviderSettings,
    transport: Arc<dyn Transport>,
) -> Arc<dyn GenerationProvider> {
    tracing::debug!(
        provider = %settings.provider,
        model = settings.model_id(),
        "selecting provider adapter"
    );
    match settings.provider.wire_format() {
        WireFormat::GeminiSdk => Arc::new(GeminiSdkProvider::new(settings, transport)),
        WireFormat::GeminiRest => Arc::new(GeminiRestProvider::new(settings, transport)),
        WireFormat::OpenAiCompatible => Arc::new(OpenAiCompatProvider::new(settings, transport)),
    }
}
