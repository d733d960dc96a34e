use std::sync::Arc;

use codegen_protocol::WireFormat;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use llm_api::{ByteStream, LlmApiClient, LlmApiError};
use serde_json::Value;

/// Opens one streaming provider call.
///
/// Adapters hold this behind an `Arc` so tests can script the raw body.
pub trait Transport: Send + Sync {
    fn open_stream(
        &self,
        wire: WireFormat,
        url: String,
        body: Value,
    ) -> BoxFuture<'static, Result<ByteStream, LlmApiError>>;
}

/// Transport backed by the real HTTP client.
#[derive(Debug, Clone)]
pub struct ClientTransport {
    client: Arc<LlmApiClient>,
}

impl ClientTransport {
    pub fn new(client: LlmApiClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl Transport for ClientTransport {
    fn open_stream(
        &self,
        wire: WireFormat,
        url: String,
        body: Value,
    ) -> BoxFuture<'static, Result<ByteStream, LlmApiError>> {
        let client = Arc::clone(&self.client);
        async move { client.open_stream(wire, &url, &body).await }.boxed()
    }
}
