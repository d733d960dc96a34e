//! Transport-only LLM API client primitives.
//!
//! This crate owns request building, endpoint normalization, streaming
//! transport, and wire-level chunk decoding for the supported provider wire
//! formats. It knows nothing about action records beyond the shared frame
//! extractor it uses to recover provider envelopes.
//!
//! Decoding yields [`StreamDelta`] values: assistant text to be fed into the
//! action decoder, or a provider error envelope that ends the call.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod events;
pub mod headers;
pub mod payload;
pub mod retry;
pub mod sse;
pub mod url;
pub mod utf8;

pub use client::{ByteStream, LlmApiClient};
pub use config::LlmApiConfig;
pub use envelope::{delta_decoder, DeltaDecoder, EnvelopeDecoder, EnvelopeShape, SseChunkDecoder};
pub use error::LlmApiError;
pub use events::{GenerateContentResponse, StreamDelta};
pub use payload::{ChatCompletionRequest, ChatMessage, GeminiContent, GeminiPart, GeminiRequest};
pub use sse::SseStreamParser;
pub use url::{default_base_url, gemini_stream_url, normalize_chat_completions_url};
pub use utf8::Utf8Carry;

pub use reqwest::StatusCode;
