//! Deterministic mock implementation of the `GenerationProvider` contract.
//!
//! Scripts are serialized to the action-record wire text, cut into small
//! character chunks, and decoded through the same `ActionDecoder` the real
//! adapters use. Intended for local development and state-machine tests.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use codegen_protocol::{
    classify, ActionDecoder, ActionRecord, ActionStream, GenerationProvider, HistoryTurn,
    ProviderFailure, ProviderProfile,
};
use futures_util::stream::{self, StreamExt};

/// Stable provider identifier used for explicit startup selection.
pub const MOCK_PROVIDER_ID: &str = "mock";

/// One scripted step of a mock call.
#[derive(Debug, Clone, PartialEq)]
pub enum MockStep {
    Record(ActionRecord),
    /// Raw assistant text, delivered as-is (prose, malformed frames).
    Raw(String),
    /// Transport failure; ends the call with one classified `Error`.
    Fail(ProviderFailure),
}

/// Prompt and history size observed by one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedCall {
    pub history_len: usize,
    pub prompt: String,
}

#[derive(Debug)]
pub struct MockProvider {
    scripts: Mutex<VecDeque<Vec<MockStep>>>,
    fallback: Vec<MockStep>,
    chunk_chars: usize,
    delay: Duration,
    calls: Mutex<Vec<ObservedCall>>,
}

impl MockProvider {
    const CHUNK_CHARS: usize = 7;
    const TOKEN_DELAY_MS: u64 = 15;

    /// Replays `steps` on every call.
    #[must_use]
    pub fn new(steps: Vec<MockStep>) -> Self {
        Self {
            scripts: Mutex::new(VecDeque::new()),
            fallback: steps,
            chunk_chars: Self::CHUNK_CHARS,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Replays one script per call, then `fallback` once the queue is empty.
    #[must_use]
    pub fn scripted(scripts: Vec<Vec<MockStep>>, fallback: Vec<MockStep>) -> Self {
        let provider = Self::new(fallback);
        *lock_unpoisoned(&provider.scripts) = scripts.into();
        provider
    }

    /// Replays plain records on every call.
    #[must_use]
    pub fn from_records(records: Vec<ActionRecord>) -> Self {
        Self::new(records.into_iter().map(MockStep::Record).collect())
    }

    #[must_use]
    pub fn with_chunk_chars(mut self, chunk_chars: usize) -> Self {
        self.chunk_chars = chunk_chars.max(1);
        self
    }

    /// Pause between chunks, for interactive demos.
    #[must_use]
    pub fn with_token_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Demo pacing used by the CLI.
    #[must_use]
    pub fn paced(self) -> Self {
        self.with_token_delay(Duration::from_millis(Self::TOKEN_DELAY_MS))
    }

    #[must_use]
    pub fn calls(&self) -> Vec<ObservedCall> {
        lock_unpoisoned(&self.calls).clone()
    }

    fn next_script(&self) -> Vec<MockStep> {
        lock_unpoisoned(&self.scripts)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn emissions(&self, steps: Vec<MockStep>) -> VecDeque<Emission> {
        let mut emissions = VecDeque::new();
        for step in steps {
            let text = match step {
                MockStep::Record(record) => format!("{}\n", record.to_wire()),
                MockStep::Raw(text) => text,
                MockStep::Fail(failure) => {
                    emissions.push_back(Emission::Failure(failure));
                    break;
                }
            };
            let chars: Vec<char> = text.chars().collect();
            emissions.extend(
                chars
                    .chunks(self.chunk_chars)
                    .map(|chunk| Emission::Text(chunk.iter().collect())),
            );
        }
        emissions
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::from_records(demo_project())
    }
}

/// Small static site used when no script is given.
#[must_use]
pub fn demo_project() -> Vec<ActionRecord> {
    vec![
        ActionRecord::thinking("Plan a static landing page with a deploy script."),
        ActionRecord::thinking("Files: index.html, css/style.css, deploy.sh."),
        ActionRecord::create_file("index.html"),
        ActionRecord::create_file("css/style.css"),
        ActionRecord::create_file("deploy.sh"),
        ActionRecord::append_to_file(
            "index.html",
            "<!doctype html>\n<html>\n<head>\n  <link rel=\"stylesheet\" href=\"css/style.css\">\n</head>\n",
        ),
        ActionRecord::append_to_file(
            "index.html",
            "<body>\n  <h1>Hello {world}</h1>\n</body>\n</html>\n",
        ),
        ActionRecord::append_to_file(
            "css/style.css",
            "body {\n  font-family: sans-serif;\n  margin: 2rem;\n}\n",
        ),
        ActionRecord::append_to_file(
            "deploy.sh",
            "#!/bin/sh\nif command -v python3 >/dev/null; then\n  echo \"Serving on http://localhost:8000\"\n  python3 -m http.server 8000\nfi\n",
        ),
        ActionRecord::finish(vec![
            "Add a contact form".to_owned(),
            "Add dark mode".to_owned(),
        ]),
    ]
}

enum Emission {
    Text(String),
    Failure(ProviderFailure),
}

struct Replay {
    emissions: VecDeque<Emission>,
    decoder: ActionDecoder,
    pending: VecDeque<ActionRecord>,
    delay: Duration,
}

impl Replay {
    async fn next_record(&mut self) -> Option<ActionRecord> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(record);
            }
            match self.emissions.pop_front()? {
                Emission::Text(text) => {
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    self.pending.extend(self.decoder.feed(&text));
                }
                Emission::Failure(failure) => {
                    self.emissions.clear();
                    return Some(classify(&failure).into_record());
                }
            }
        }
    }
}

impl GenerationProvider for MockProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: MOCK_PROVIDER_ID.to_owned(),
            model_id: "mock".to_owned(),
        }
    }

    fn stream_generation(&self, history: &[HistoryTurn], prompt: &str) -> ActionStream {
        lock_unpoisoned(&self.calls).push(ObservedCall {
            history_len: history.len(),
            prompt: prompt.to_owned(),
        });

        let replay = Replay {
            emissions: self.emissions(self.next_script()),
            decoder: ActionDecoder::new(),
            pending: VecDeque::new(),
            delay: self.delay,
        };
        stream::unfold(replay, |mut replay| async move {
            let record = replay.next_record().await?;
            Some((record, replay))
        })
        .boxed()
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use codegen_protocol::RATE_LIMIT_MESSAGE;
    use serde_json::json;

    use super::*;

    async fn collect(provider: &MockProvider) -> Vec<ActionRecord> {
        provider.stream_generation(&[], "test").collect().await
    }

    #[test]
    fn profile_exposes_explicit_mock_provider_identity() {
        let profile = MockProvider::default().profile();
        assert_eq!(profile.provider_id, MOCK_PROVIDER_ID);
        assert_eq!(profile.model_id, "mock");
    }

    #[tokio::test]
    async fn default_script_replays_demo_project() {
        let records = collect(&MockProvider::default().with_chunk_chars(1)).await;
        assert_eq!(records, demo_project());
        assert!(records.last().is_some_and(ActionRecord::is_terminal));
    }

    #[tokio::test]
    async fn prose_and_malformed_frames_are_skipped() {
        let provider = MockProvider::new(vec![
            MockStep::Raw("Sure! here you go { not json } ".to_owned()),
            MockStep::Raw("{\"action\":\"UNKNOWN\"}".to_owned()),
            MockStep::Record(ActionRecord::thinking("ok")),
        ]);
        assert_eq!(collect(&provider).await, vec![ActionRecord::thinking("ok")]);
    }

    #[tokio::test]
    async fn failure_step_ends_call_with_one_error() {
        let provider = MockProvider::new(vec![
            MockStep::Record(ActionRecord::create_file("a.txt")),
            MockStep::Fail(ProviderFailure::Payload(
                json!({"error": {"status": "RESOURCE_EXHAUSTED", "message": "quota"}}),
            )),
            MockStep::Record(ActionRecord::create_file("never.txt")),
        ]);
        assert_eq!(
            collect(&provider).await,
            vec![
                ActionRecord::create_file("a.txt"),
                ActionRecord::error(RATE_LIMIT_MESSAGE)
            ]
        );
    }

    #[tokio::test]
    async fn scripts_are_consumed_per_call_and_calls_are_recorded() {
        let provider = MockProvider::scripted(
            vec![vec![MockStep::Record(ActionRecord::thinking("first"))]],
            vec![MockStep::Record(ActionRecord::thinking("rest"))],
        );
        let history = vec![HistoryTurn::user("u"), HistoryTurn::assistant("a")];

        let first: Vec<ActionRecord> = provider.stream_generation(&[], "one").collect().await;
        let second: Vec<ActionRecord> = provider.stream_generation(&history, "two").collect().await;

        assert_eq!(first, vec![ActionRecord::thinking("first")]);
        assert_eq!(second, vec![ActionRecord::thinking("rest")]);
        assert_eq!(
            provider.calls(),
            vec![
                ObservedCall {
                    history_len: 0,
                    prompt: "one".to_owned()
                },
                ObservedCall {
                    history_len: 2,
                    prompt: "two".to_owned()
                },
            ]
        );
    }
}
