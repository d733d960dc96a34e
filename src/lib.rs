//! Streaming project generation core.
//!
//! A provider streams action records (see [`codegen_protocol::ActionRecord`]);
//! [`apply`] folds them into a [`GenerationSession`] that owns the virtual
//! [`Project`] and the conversation history. [`GenerationRunner`] drives one
//! provider call at a time and honors a shared cancel signal.
//!
//! # Session lifecycle
//! - `idle` → `streaming` on submission.
//! - `streaming` → `finished` on a complete `FINISH` record.
//! - `streaming` → `errored` on an `ERROR` record.
//! - `streaming` → `awaiting_continuation` when the stream ends (or is
//!   cancelled) after producing output; `idle` when it produced nothing.
//!
//! A prompt submitted while a finished project exists becomes a
//! project-update call that carries the whole project in the prompt.

pub mod interpreter;
pub mod project;
pub mod prompt;
pub mod runner;
pub mod session;
pub mod tree;

pub use crate::interpreter::{apply, Applied};
pub use crate::project::{FileContents, GenerationStats, Project};
pub use crate::prompt::{project_update_prompt, CONTINUATION_PROMPT};
pub use crate::runner::{CancelSignal, GenerationRunner};
pub use crate::session::{
    CallMode, GenerationSession, PreparedCall, ProjectMetadata, RestoredProject, SessionStatus,
    Submission, SubmitError, ERROR_EMPTY_PROMPT, ERROR_MISSING_API_KEY, ERROR_NOTHING_TO_CONTINUE,
    ERROR_RUN_ALREADY_ACTIVE,
};
pub use crate::tree::{FileNode, FileTree, NodeKind};
