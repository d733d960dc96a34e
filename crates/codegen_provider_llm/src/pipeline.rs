//! Lazy action-record pipeline shared by every adapter.
//!
//! The decoder state (wire decoder, frame buffer, pending records) is threaded
//! through [`stream::unfold`] as an explicit accumulator, one per call.

use std::collections::VecDeque;

use codegen_protocol::{classify, ActionDecoder, ActionRecord, ActionStream, ProviderFailure};
use futures_util::future::BoxFuture;
use futures_util::stream::{self, StreamExt};
use llm_api::envelope::DeltaDecoder;
use llm_api::{ByteStream, LlmApiError, StreamDelta};

type Opening = BoxFuture<'static, Result<ByteStream, LlmApiError>>;

enum Phase {
    Opening(Opening),
    Streaming(ByteStream),
    Done,
}

struct Pipeline {
    phase: Phase,
    wire: Box<dyn DeltaDecoder>,
    actions: ActionDecoder,
    pending: VecDeque<ActionRecord>,
}

impl Pipeline {
    fn absorb(&mut self, deltas: Vec<StreamDelta>) {
        for delta in deltas {
            match delta {
                StreamDelta::Text(text) => self.pending.extend(self.actions.feed(&text)),
                StreamDelta::Failure(envelope) => {
                    self.fail(ProviderFailure::Payload(envelope));
                    return;
                }
            }
        }
    }

    /// Queues the single classified `Error` record and ends the call.
    fn fail(&mut self, failure: ProviderFailure) {
        let classified = classify(&failure);
        tracing::warn!(
            rate_limited = classified.rate_limited,
            message = %classified.message,
            "provider call failed"
        );
        self.pending.push_back(classified.into_record());
        self.phase = Phase::Done;
    }

    async fn next_record(&mut self) -> Option<ActionRecord> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(record);
            }

            match std::mem::replace(&mut self.phase, Phase::Done) {
                Phase::Done => return None,
                Phase::Opening(opening) => match opening.await {
                    Ok(bytes) => self.phase = Phase::Streaming(bytes),
                    Err(error) => self.fail(error.to_failure()),
                },
                Phase::Streaming(mut bytes) => match bytes.next().await {
                    Some(Ok(chunk)) => {
                        self.phase = Phase::Streaming(bytes);
                        let deltas = self.wire.feed(&chunk);
                        self.absorb(deltas);
                    }
                    Some(Err(error)) => self.fail(error.to_failure()),
                    None => {
                        let deltas = self.wire.finish();
                        self.absorb(deltas);
                        if self.actions.skipped_frames() > 0 {
                            tracing::debug!(
                                skipped = self.actions.skipped_frames(),
                                "call finished with skipped frames"
                            );
                        }
                    }
                },
            }
        }
    }
}

/// Builds the lazy record stream for one call.
///
/// Nothing is sent until the stream is first polled. Dropping the stream
/// drops the transport.
pub fn action_stream(opening: Opening, wire: Box<dyn DeltaDecoder>) -> ActionStream {
    let pipeline = Pipeline {
        phase: Phase::Opening(opening),
        wire,
        actions: ActionDecoder::new(),
        pending: VecDeque::new(),
    };

    stream::unfold(pipeline, |mut pipeline| async move {
        let record = pipeline.next_record().await?;
        Some((record, pipeline))
    })
    .boxed()
}
