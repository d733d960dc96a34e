//! Wire-shape decoders from raw transport bytes to [`StreamDelta`] values.
//!
//! The REST shapes are composed from two layers of frame extraction: provider
//! envelopes are recovered from the raw body with the same balanced-brace
//! extractor that later recovers action records from the assistant text.

use codegen_protocol::{FrameBuffer, WireFormat};
use serde_json::Value;

use crate::events::{
    error_envelope, gemini_rest_text, openai_delta_text, GenerateContentResponse, StreamDelta,
};
use crate::sse::SseStreamParser;
use crate::utf8::Utf8Carry;

/// Incremental decoder for one provider wire format.
pub trait DeltaDecoder: Send {
    /// Consumes one transport chunk and returns the deltas it completes.
    fn feed(&mut self, bytes: &[u8]) -> Vec<StreamDelta>;

    /// Drains buffered data once the transport completes.
    fn finish(&mut self) -> Vec<StreamDelta> {
        Vec::new()
    }
}

/// Builds the decoder matching a wire format.
pub fn delta_decoder(wire: WireFormat) -> Box<dyn DeltaDecoder> {
    match wire {
        WireFormat::GeminiSdk => Box::new(SseChunkDecoder::default()),
        WireFormat::GeminiRest => Box::new(EnvelopeDecoder::new(EnvelopeShape::GeminiRest)),
        WireFormat::OpenAiCompatible => {
            Box::new(EnvelopeDecoder::new(EnvelopeShape::OpenAiCompatible))
        }
    }
}

/// Gemini SSE stream of typed chunks; each chunk's text is read directly.
#[derive(Debug, Default)]
pub struct SseChunkDecoder {
    parser: SseStreamParser,
}

impl SseChunkDecoder {
    fn decode_payloads(payloads: Vec<String>) -> Vec<StreamDelta> {
        payloads
            .iter()
            .filter_map(|payload| decode_sdk_payload(payload))
            .collect()
    }
}

impl DeltaDecoder for SseChunkDecoder {
    fn feed(&mut self, bytes: &[u8]) -> Vec<StreamDelta> {
        Self::decode_payloads(self.parser.feed(bytes))
    }

    fn finish(&mut self) -> Vec<StreamDelta> {
        Self::decode_payloads(self.parser.finish())
    }
}

fn decode_sdk_payload(payload: &str) -> Option<StreamDelta> {
    let value = match serde_json::from_str::<Value>(payload) {
        Ok(value) => value,
        Err(error) => {
            tracing::debug!(%error, "dropping undecodable SSE payload");
            return None;
        }
    };
    if let Some(envelope) = error_envelope(&value) {
        return Some(StreamDelta::Failure(envelope.clone()));
    }

    let chunk = match serde_json::from_value::<GenerateContentResponse>(value) {
        Ok(chunk) => chunk,
        Err(error) => {
            tracing::debug!(%error, "dropping SSE payload that is not a response chunk");
            return None;
        }
    };
    let text = chunk.text();
    (!text.is_empty()).then_some(StreamDelta::Text(text))
}

/// Envelope layout of a brace-framed REST stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape {
    /// `candidates[0].content.parts[0].text`
    GeminiRest,
    /// `choices[0].delta.content`
    OpenAiCompatible,
}

impl EnvelopeShape {
    fn text<'a>(&self, envelope: &'a Value) -> Option<&'a str> {
        match self {
            Self::GeminiRest => gemini_rest_text(envelope),
            Self::OpenAiCompatible => openai_delta_text(envelope),
        }
    }
}

/// Outer frame layer for REST streams.
///
/// Array brackets, commas, `data:` prefixes and `[DONE]` sentinels contain no
/// braces and are discarded by the extractor.
#[derive(Debug)]
pub struct EnvelopeDecoder {
    shape: EnvelopeShape,
    utf8: Utf8Carry,
    frames: FrameBuffer,
}

impl EnvelopeDecoder {
    pub fn new(shape: EnvelopeShape) -> Self {
        Self {
            shape,
            utf8: Utf8Carry::default(),
            frames: FrameBuffer::new(),
        }
    }

    fn decode_text(&mut self, text: &str) -> Vec<StreamDelta> {
        let mut deltas = Vec::new();
        for frame in self.frames.feed(text) {
            let Ok(envelope) = serde_json::from_str::<Value>(&frame) else {
                continue;
            };
            if let Some(error) = error_envelope(&envelope) {
                deltas.push(StreamDelta::Failure(error.clone()));
                continue;
            }
            match self.shape.text(&envelope) {
                Some(text) if !text.is_empty() => deltas.push(StreamDelta::Text(text.to_owned())),
                _ => tracing::trace!("envelope carried no text delta"),
            }
        }
        deltas
    }
}

impl DeltaDecoder for EnvelopeDecoder {
    fn feed(&mut self, bytes: &[u8]) -> Vec<StreamDelta> {
        let text = self.utf8.decode(bytes);
        self.decode_text(&text)
    }

    fn finish(&mut self) -> Vec<StreamDelta> {
        let rest = self.utf8.finish();
        self.decode_text(&rest)
    }
}
