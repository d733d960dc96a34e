use futures_util::stream::BoxStream;

/// One structured part of a code-execution reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionPart {
    Text(String),
    ExecutableCode {
        language: Option<String>,
        code: String,
    },
    CodeExecutionResult {
        outcome: Option<String>,
        output: Option<String>,
    },
    /// Service-level failure, already classified for display.
    Error(String),
}

impl ExecutionPart {
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Lazy sequence of parts for one execution message.
pub type ExecutionStream<'a> = BoxStream<'a, ExecutionPart>;

/// Stateful code-execution chat.
///
/// The session keeps its own history; each message is answered with a lazy
/// part sequence that ends after the reply or after one `Error` part.
pub trait ExecutionSession: Send {
    fn send_message<'a>(&'a mut self, message: &str) -> ExecutionStream<'a>;
}
