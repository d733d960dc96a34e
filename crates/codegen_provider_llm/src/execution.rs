use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use codegen_protocol::{
    classify, ExecutionPart, ExecutionSession, ExecutionStream, ProviderFailure, WireFormat,
};
use futures_util::stream::{self, StreamExt};
use llm_api::events::error_envelope;
use llm_api::{ByteStream, GeminiContent, GeminiPart, GeminiRequest, GenerateContentResponse, SseStreamParser};
use serde_json::Value;

use crate::transport::Transport;

/// Gemini chat session with the code-execution tool enabled.
///
/// History lives in the session; the model's reply is appended once its
/// stream completes.
pub struct GeminiExecutionSession {
    url: String,
    transport: Arc<dyn Transport>,
    history: Arc<Mutex<Vec<GeminiContent>>>,
}

impl GeminiExecutionSession {
    pub fn new(url: String, transport: Arc<dyn Transport>) -> Self {
        Self {
            url,
            transport,
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn history_len(&self) -> usize {
        lock_unpoisoned(&self.history).len()
    }
}

impl ExecutionSession for GeminiExecutionSession {
    fn send_message<'a>(&'a mut self, message: &str) -> ExecutionStream<'a> {
        let contents = {
            let mut history = lock_unpoisoned(&self.history);
            history.push(GeminiContent::user(message));
            history.clone()
        };

        let request = GeminiRequest::code_execution(contents);
        let state = match serde_json::to_value(&request) {
            Ok(body) => Reply {
                phase: ReplyPhase::Opening(self.transport.open_stream(
                    WireFormat::GeminiSdk,
                    self.url.clone(),
                    body,
                )),
                parser: SseStreamParser::default(),
                pending: VecDeque::new(),
                reply: Vec::new(),
                history: Arc::clone(&self.history),
            },
            Err(error) => Reply::failed(
                ProviderFailure::Exception(error.to_string()),
                Arc::clone(&self.history),
            ),
        };

        stream::unfold(state, |mut state| async move {
            let part = state.next_part().await?;
            Some((part, state))
        })
        .boxed()
    }
}

enum ReplyPhase {
    Opening(futures_util::future::BoxFuture<'static, Result<ByteStream, llm_api::LlmApiError>>),
    Streaming(ByteStream),
    Done,
}

struct Reply {
    phase: ReplyPhase,
    parser: SseStreamParser,
    pending: VecDeque<ExecutionPart>,
    reply: Vec<GeminiPart>,
    history: Arc<Mutex<Vec<GeminiContent>>>,
}

impl Reply {
    fn failed(failure: ProviderFailure, history: Arc<Mutex<Vec<GeminiContent>>>) -> Self {
        let mut reply = Self {
            phase: ReplyPhase::Done,
            parser: SseStreamParser::default(),
            pending: VecDeque::new(),
            reply: Vec::new(),
            history,
        };
        reply.fail(failure);
        reply
    }

    fn fail(&mut self, failure: ProviderFailure) {
        let message = classify(&failure).message;
        tracing::warn!(%message, "code execution call failed");
        self.pending.push_back(ExecutionPart::Error(message));
        self.phase = ReplyPhase::Done;
    }

    fn absorb(&mut self, payloads: Vec<String>) {
        for payload in payloads {
            let Ok(value) = serde_json::from_str::<Value>(&payload) else {
                continue;
            };
            if let Some(envelope) = error_envelope(&value) {
                self.fail(ProviderFailure::Payload(envelope.clone()));
                return;
            }
            let Ok(chunk) = serde_json::from_value::<GenerateContentResponse>(value) else {
                continue;
            };
            if let Some(content) = chunk.candidates.first().and_then(|c| c.content.as_ref()) {
                self.reply
                    .extend(content.parts.iter().filter(|part| !part.is_thought()).cloned());
            }
            self.pending.extend(chunk.execution_parts());
        }
    }

    fn record_reply(&mut self) {
        if self.reply.is_empty() {
            return;
        }
        let parts = std::mem::take(&mut self.reply);
        lock_unpoisoned(&self.history).push(GeminiContent {
            role: Some("model".to_owned()),
            parts,
        });
    }

    async fn next_part(&mut self) -> Option<ExecutionPart> {
        loop {
            if let Some(part) = self.pending.pop_front() {
                return Some(part);
            }

            match std::mem::replace(&mut self.phase, ReplyPhase::Done) {
                ReplyPhase::Done => return None,
                ReplyPhase::Opening(opening) => match opening.await {
                    Ok(bytes) => self.phase = ReplyPhase::Streaming(bytes),
                    Err(error) => self.fail(error.to_failure()),
                },
                ReplyPhase::Streaming(mut bytes) => match bytes.next().await {
                    Some(Ok(chunk)) => {
                        self.phase = ReplyPhase::Streaming(bytes);
                        let payloads = self.parser.feed(&chunk);
                        self.absorb(payloads);
                    }
                    Some(Err(error)) => self.fail(error.to_failure()),
                    None => {
                        let payloads = self.parser.finish();
                        self.absorb(payloads);
                        self.record_reply();
                    }
                },
            }
        }
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
