use codegen_protocol::WireFormat;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;

use crate::config::LlmApiConfig;
use crate::error::LlmApiError;
use crate::headers::build_headers;
use crate::retry::{backoff_delay, is_retryable_http_error, is_retryable_transport_error, MAX_RETRIES};

/// Raw response body chunks, in arrival order.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, LlmApiError>>;

#[derive(Debug)]
pub struct LlmApiClient {
    http: Client,
    config: LlmApiConfig,
}

impl LlmApiClient {
    pub fn new(config: LlmApiConfig) -> Result<Self, LlmApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(LlmApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn build_headers(&self, wire: WireFormat) -> Result<HeaderMap, LlmApiError> {
        let headers = build_headers(&self.config, wire)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| LlmApiError::InvalidHeader(format!("invalid header key: {key}")))?,
                HeaderValue::from_str(&value).map_err(|_| {
                    LlmApiError::InvalidHeader(format!("invalid header value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    pub fn build_request<B>(
        &self,
        wire: WireFormat,
        url: &str,
        body: &B,
    ) -> Result<reqwest::RequestBuilder, LlmApiError>
    where
        B: Serialize + ?Sized,
    {
        let headers = self.build_headers(wire)?;
        Ok(self.http.post(url).headers(headers).json(body))
    }

    /// POST the request, retrying transient failures with exponential backoff.
    pub async fn send_with_retry<B>(
        &self,
        wire: WireFormat,
        url: &str,
        body: &B,
    ) -> Result<Response, LlmApiError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let mut last_status: Option<StatusCode> = None;
        let mut last_error = None;

        for attempt in 0..=MAX_RETRIES {
            match self.build_request(wire, url, body)?.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    last_status = Some(status);
                    let body = response.text().await.unwrap_or_else(|_| {
                        status
                            .canonical_reason()
                            .unwrap_or("request failed")
                            .to_owned()
                    });
                    if attempt < MAX_RETRIES && is_retryable_http_error(status.as_u16(), &body) {
                        tracing::warn!(
                            status = status.as_u16(),
                            attempt = attempt + 1,
                            "provider request failed; retrying"
                        );
                        last_error = Some(body);
                        tokio::time::sleep(backoff_delay(attempt)).await;
                        continue;
                    }

                    return Err(LlmApiError::Status { status, body });
                }
                Err(error) => {
                    let retryable = is_retryable_transport_error(&error);
                    if attempt < MAX_RETRIES && retryable {
                        tracing::warn!(
                            error = %error,
                            attempt = attempt + 1,
                            "provider transport error; retrying"
                        );
                        last_error = Some(error.to_string());
                        tokio::time::sleep(backoff_delay(attempt)).await;
                        continue;
                    }
                    if !retryable {
                        return Err(LlmApiError::Request(error));
                    }
                    return Err(LlmApiError::RetryExhausted {
                        status: last_status,
                        last_error: Some(error.to_string()),
                    });
                }
            }
        }

        Err(LlmApiError::RetryExhausted {
            status: last_status,
            last_error,
        })
    }

    /// Open a streaming call and hand back its body as a byte stream.
    pub async fn open_stream<B>(
        &self,
        wire: WireFormat,
        url: &str,
        body: &B,
    ) -> Result<ByteStream, LlmApiError>
    where
        B: Serialize + Sync + ?Sized,
    {
        tracing::debug!(url, ?wire, "opening provider stream");
        let response = self.send_with_retry(wire, url, body).await?;
        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(LlmApiError::from));
        Ok(bytes.boxed())
    }
}
