//! Provider-agnostic generation protocol.
//!
//! This crate owns the action-record wire schema, the balanced-brace frame
//! extractor that recovers records from arbitrarily chunked text, the failure
//! classifier shared by every adapter, and the capability trait adapters
//! implement. It contains no transport code.

pub mod action;
pub mod classify;
pub mod decoder;
pub mod execution;
pub mod frame;
pub mod provider;
pub mod settings;

pub use action::ActionRecord;
pub use classify::{classify, ClassifiedError, ProviderFailure, RATE_LIMIT_MESSAGE};
pub use decoder::ActionDecoder;
pub use execution::{ExecutionPart, ExecutionSession, ExecutionStream};
pub use frame::{extract_next, Extraction, FrameBuffer};
pub use provider::{
    ActionStream, GenerationProvider, HistoryTurn, ProviderInitError, ProviderProfile, Role,
};
pub use settings::{ProviderKind, ProviderSettings, WireFormat, DEFAULT_MODEL};
