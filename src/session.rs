//! Generation session state machine.

use std::fmt;
use std::time::Instant;

use codegen_protocol::HistoryTurn;
use serde::{Deserialize, Serialize};

use crate::project::{FileContents, GenerationStats, Project};
use crate::prompt::{project_update_prompt, CONTINUATION_PROMPT};
use crate::tree::FileTree;

pub const ERROR_RUN_ALREADY_ACTIVE: &str = "Run already active";
pub const ERROR_MISSING_API_KEY: &str = "API key is not configured";
pub const ERROR_NOTHING_TO_CONTINUE: &str = "no active generation session to continue";
pub const ERROR_EMPTY_PROMPT: &str = "prompt is empty";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Streaming,
    Finished,
    Errored,
    AwaitingContinuation,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Streaming => "streaming",
            Self::Finished => "finished",
            Self::Errored => "errored",
            Self::AwaitingContinuation => "awaiting_continuation",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// New instruction; updates the current project when one is finished.
    Prompt(String),
    /// New instruction that always starts from an empty project.
    Fresh(String),
    /// Resume the current generation.
    Continue,
}

/// How a submission was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    Fresh,
    Update,
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    RunAlreadyActive,
    MissingApiKey,
    NothingToContinue,
    EmptyPrompt,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::RunAlreadyActive => ERROR_RUN_ALREADY_ACTIVE,
            Self::MissingApiKey => ERROR_MISSING_API_KEY,
            Self::NothingToContinue => ERROR_NOTHING_TO_CONTINUE,
            Self::EmptyPrompt => ERROR_EMPTY_PROMPT,
        };
        f.write_str(message)
    }
}

impl std::error::Error for SubmitError {}

/// Input for one provider call: prior turns and the prompt to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCall {
    pub mode: CallMode,
    pub history: Vec<HistoryTurn>,
    pub prompt: String,
}

/// Identity of a saved or imported project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

/// A project restored from storage or an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredProject {
    pub metadata: ProjectMetadata,
    pub prompt: String,
    pub tree: Option<FileTree>,
    pub contents: FileContents,
    pub stats: Option<GenerationStats>,
}

/// Per-call bookkeeping, reset by every submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CallLog {
    pub(crate) received: usize,
    pub(crate) transcript: String,
}

#[derive(Debug, Clone)]
pub struct GenerationSession {
    pub(crate) status: SessionStatus,
    pub(crate) history: Vec<HistoryTurn>,
    pub(crate) thinking_log: Vec<String>,
    pub(crate) last_error: Option<String>,
    pub(crate) suggestions: Vec<String>,
    pub(crate) continuation_available: bool,
    pub(crate) project: Project,
    pub(crate) prompt: String,
    pub(crate) selected_file: Option<String>,
    pub(crate) stats: Option<GenerationStats>,
    pub(crate) metadata: Option<ProjectMetadata>,
    pub(crate) started_at: Option<Instant>,
    pub(crate) call: CallLog,
}

impl Default for GenerationSession {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            history: Vec::new(),
            thinking_log: Vec::new(),
            last_error: None,
            suggestions: Vec::new(),
            continuation_available: false,
            project: Project::new(),
            prompt: String::new(),
            selected_file: None,
            stats: None,
            metadata: None,
            started_at: None,
            call: CallLog::default(),
        }
    }
}

impl GenerationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn history(&self) -> &[HistoryTurn] {
        &self.history
    }

    pub fn thinking_log(&self) -> &[String] {
        &self.thinking_log
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// True when partial output exists and the user may resume.
    pub fn continuation_available(&self) -> bool {
        self.continuation_available
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// The user's original request for the current project.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn selected_file(&self) -> Option<&str> {
        self.selected_file.as_deref()
    }

    pub fn stats(&self) -> Option<&GenerationStats> {
        self.stats.as_ref()
    }

    pub fn metadata(&self) -> Option<&ProjectMetadata> {
        self.metadata.as_ref()
    }

    pub fn set_metadata(&mut self, metadata: ProjectMetadata) {
        self.metadata = Some(metadata);
    }

    /// Resolves a submission and moves to `streaming`.
    ///
    /// The returned history excludes the prompt; the prompt is recorded as
    /// the next user turn.
    pub fn begin(&mut self, submission: Submission) -> Result<PreparedCall, SubmitError> {
        if self.status == SessionStatus::Streaming {
            return Err(SubmitError::RunAlreadyActive);
        }

        let (mode, prompt) = match submission {
            Submission::Continue => {
                if self.history.is_empty() {
                    return Err(SubmitError::NothingToContinue);
                }
                (CallMode::Continue, CONTINUATION_PROMPT.to_owned())
            }
            Submission::Prompt(text) | Submission::Fresh(text) if text.trim().is_empty() => {
                return Err(SubmitError::EmptyPrompt);
            }
            Submission::Prompt(text)
                if self.status == SessionStatus::Finished && self.project.has_content() =>
            {
                let prompt = project_update_prompt(&self.prompt, &text, &self.project);
                if self.prompt.trim().is_empty() {
                    self.prompt = text;
                }
                (CallMode::Update, prompt)
            }
            Submission::Prompt(text) | Submission::Fresh(text) => {
                self.prompt = text.clone();
                (CallMode::Fresh, text)
            }
        };

        match mode {
            CallMode::Fresh => {
                self.project.clear();
                self.selected_file = None;
                self.metadata = None;
                self.history.clear();
                self.thinking_log.clear();
                self.stats = None;
                self.started_at = Some(Instant::now());
            }
            CallMode::Update => {
                self.history.clear();
                self.thinking_log.clear();
                self.stats = None;
                self.started_at = Some(Instant::now());
            }
            CallMode::Continue => {
                if self.started_at.is_none() {
                    self.started_at = Some(Instant::now());
                }
            }
        }

        self.status = SessionStatus::Streaming;
        self.last_error = None;
        self.suggestions.clear();
        self.continuation_available = false;
        self.call = CallLog::default();

        let history = self.history.clone();
        self.history.push(HistoryTurn::user(prompt.clone()));
        tracing::debug!(?mode, history = history.len(), "generation call prepared");

        Ok(PreparedCall {
            mode,
            history,
            prompt,
        })
    }

    /// Settles a call whose stream ended without a terminal record.
    ///
    /// Also used when the caller abandons the stream.
    pub fn end_of_stream(&mut self) {
        if self.status != SessionStatus::Streaming {
            return;
        }
        if self.call.received > 0 {
            self.record_assistant_turn();
            self.status = SessionStatus::AwaitingContinuation;
            self.continuation_available = true;
        } else {
            self.status = SessionStatus::Idle;
        }
        tracing::info!(status = %self.status, records = self.call.received, "stream ended without finish");
    }

    pub(crate) fn record_assistant_turn(&mut self) {
        if self.call.transcript.is_empty() {
            return;
        }
        let transcript = std::mem::take(&mut self.call.transcript);
        self.history.push(HistoryTurn::assistant(transcript));
    }

    pub(crate) fn elapsed(&self) -> std::time::Duration {
        self.started_at
            .map(|started| started.elapsed())
            .unwrap_or_default()
    }

    pub fn select_file(&mut self, path: &str) -> bool {
        match self.project.tree().find(path) {
            Some(node) if !node.is_folder() => {
                self.selected_file = Some(node.path.clone());
                true
            }
            _ => false,
        }
    }

    /// Manual file creation; the new file becomes selected.
    pub fn create_file(&mut self, path: &str) -> Option<String> {
        let path = self.project.create_file(path)?;
        self.selected_file = Some(path.clone());
        Some(path)
    }

    pub fn create_folder(&mut self, path: &str) -> Option<String> {
        self.project.create_folder(path)
    }

    pub fn write_file(&mut self, path: &str, content: impl Into<String>) -> Option<String> {
        self.project.write(path, content)
    }

    /// Deletes a node; clears the selection when it pointed inside it.
    pub fn delete_node(&mut self, path: &str) -> Option<Vec<String>> {
        let removed = self.project.delete(path)?;
        if self
            .selected_file
            .as_ref()
            .is_some_and(|selected| removed.contains(selected))
        {
            self.selected_file = None;
        }
        Some(removed)
    }

    /// Replaces the session with a finished project and empty history.
    pub fn restore(&mut self, restored: RestoredProject) {
        let project = match restored.tree {
            Some(tree) => Project::from_parts(tree, restored.contents),
            None => Project::from_contents(restored.contents),
        };
        let selected_file = project.tree().first_file().map(str::to_owned);

        *self = Self {
            status: SessionStatus::Finished,
            project,
            prompt: restored.prompt,
            selected_file,
            stats: restored.stats,
            metadata: Some(restored.metadata),
            ..Self::default()
        };
    }
}
