//! Drives one provider call through the interpreter.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use codegen_protocol::{ActionRecord, ActionStream, ExecutionSession, GenerationProvider};
use futures_util::StreamExt;

use crate::interpreter::{apply, Applied};
use crate::session::{GenerationSession, SessionStatus, Submission, SubmitError};

/// Shared flag; setting it abandons the active call.
pub type CancelSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Single writer of a [`GenerationSession`].
pub struct GenerationRunner {
    provider: Arc<dyn GenerationProvider>,
    session: GenerationSession,
    cancel: CancelSignal,
    api_key_configured: bool,
}

impl GenerationRunner {
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self {
            provider,
            session: GenerationSession::new(),
            cancel: Arc::new(AtomicBool::new(false)),
            api_key_configured: true,
        }
    }

    /// Submissions fail with "API key is not configured" when `false`.
    pub fn with_api_key_configured(mut self, configured: bool) -> Self {
        self.api_key_configured = configured;
        self
    }

    pub fn provider(&self) -> &Arc<dyn GenerationProvider> {
        &self.provider
    }

    pub fn session(&self) -> &GenerationSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GenerationSession {
        &mut self.session
    }

    pub fn cancel_signal(&self) -> CancelSignal {
        Arc::clone(&self.cancel)
    }

    /// Runs one call to completion, reporting each applied record.
    ///
    /// Returns the status the session settled in. Setting the cancel signal
    /// drops the stream (closing the transport) and keeps applied output.
    pub async fn submit<F>(
        &mut self,
        submission: Submission,
        mut on_record: F,
    ) -> Result<SessionStatus, SubmitError>
    where
        F: FnMut(&ActionRecord, &Applied, &GenerationSession),
    {
        if !self.api_key_configured {
            return Err(SubmitError::MissingApiKey);
        }

        let call = self.session.begin(submission)?;
        self.cancel.store(false, Ordering::Release);
        let profile = self.provider.profile();
        tracing::info!(
            provider = %profile.provider_id,
            model = %profile.model_id,
            mode = ?call.mode,
            "starting generation call"
        );

        let mut stream = self.provider.stream_generation(&call.history, &call.prompt);
        while let Some(record) = next_or_cancel(&mut stream, &self.cancel).await {
            let applied = apply(&mut self.session, &record);
            on_record(&record, &applied, &self.session);
            if record.is_terminal() {
                break;
            }
            if is_cancelled(&self.cancel) {
                break;
            }
        }
        drop(stream);

        if is_cancelled(&self.cancel) {
            tracing::info!("generation cancelled");
        }
        self.session.end_of_stream();
        Ok(self.session.status())
    }

    /// Opens a code-execution chat when the provider supports it.
    pub fn start_execution(&self) -> Result<Box<dyn ExecutionSession>, String> {
        self.provider.start_execution_session()
    }
}

fn is_cancelled(cancel: &CancelSignal) -> bool {
    cancel.load(Ordering::Acquire)
}

/// Next record, or `None` once the stream ends or the signal is set.
async fn next_or_cancel(stream: &mut ActionStream, cancel: &CancelSignal) -> Option<ActionRecord> {
    loop {
        if is_cancelled(cancel) {
            return None;
        }
        if let Ok(next) = tokio::time::timeout(CANCEL_POLL_INTERVAL, stream.next()).await {
            return next;
        }
    }
}
