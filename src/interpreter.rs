//! Applies action records to a generation session.

use codegen_protocol::ActionRecord;

use crate::session::{GenerationSession, SessionStatus};

/// Observable effect of one applied record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Thought,
    FileCreated(String),
    Appended(String),
    Finished,
    /// `FINISH` without `isComplete`; the call stays open.
    FinishPending,
    Failed(String),
    /// The record named no usable path.
    Ignored,
}

/// Applies `record` to `session`, in stream order.
pub fn apply(session: &mut GenerationSession, record: &ActionRecord) -> Applied {
    session.call.received += 1;
    if !matches!(record, ActionRecord::Finish { .. } | ActionRecord::Error { .. }) {
        session.call.transcript.push_str(&record.to_wire());
        session.call.transcript.push('\n');
    }

    match record {
        ActionRecord::Thinking { content } => {
            session.thinking_log.push(content.clone());
            Applied::Thought
        }
        ActionRecord::CreateFile { file_path } => match session.project.create_file(file_path) {
            Some(path) => {
                if session.selected_file.is_none() {
                    session.selected_file = session.project.tree().first_file().map(str::to_owned);
                }
                Applied::FileCreated(path)
            }
            None => Applied::Ignored,
        },
        ActionRecord::AppendToFile { file_path, content } => {
            if file_path.trim().is_empty() {
                return Applied::Ignored;
            }
            session.project.append(file_path, content);
            Applied::Appended(file_path.clone())
        }
        ActionRecord::Finish {
            is_complete: true,
            suggestions,
        } => {
            session.stats = Some(session.project.stats(session.elapsed()));
            session.suggestions = suggestions.clone();
            session.status = SessionStatus::Finished;
            session.continuation_available = false;
            session.record_assistant_turn();
            tracing::info!(
                files = session.project.contents().len(),
                records = session.call.received,
                "generation finished"
            );
            Applied::Finished
        }
        ActionRecord::Finish { .. } => Applied::FinishPending,
        ActionRecord::Error { message } => {
            session.status = SessionStatus::Errored;
            session.last_error = Some(message.clone());
            session.continuation_available = session.project.has_content();
            tracing::warn!(%message, "generation failed");
            Applied::Failed(message.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use codegen_protocol::{ActionRecord, Role};

    use super::{apply, Applied};
    use crate::session::{GenerationSession, SessionStatus, Submission};

    fn streaming() -> GenerationSession {
        let mut session = GenerationSession::new();
        session
            .begin(Submission::Prompt("site".to_owned()))
            .expect("submission");
        session
    }

    #[test]
    fn thinking_only_touches_the_log() {
        let mut session = streaming();
        assert_eq!(apply(&mut session, &ActionRecord::thinking("plan")), Applied::Thought);
        assert_eq!(session.thinking_log(), ["plan".to_owned()]);
        assert!(session.project().is_empty());
        assert_eq!(session.status(), SessionStatus::Streaming);
    }

    #[test]
    fn first_created_file_becomes_selected() {
        let mut session = streaming();
        apply(&mut session, &ActionRecord::create_file("b.txt"));
        apply(&mut session, &ActionRecord::create_file("a/a.txt"));
        assert_eq!(session.selected_file(), Some("b.txt"));
    }

    #[test]
    fn error_with_partial_output_offers_continuation() {
        let mut session = streaming();
        apply(&mut session, &ActionRecord::create_file("a.txt"));
        apply(&mut session, &ActionRecord::error("boom"));
        assert_eq!(session.status(), SessionStatus::Errored);
        assert_eq!(session.last_error(), Some("boom"));
        assert!(session.continuation_available());
    }

    #[test]
    fn error_without_output_offers_nothing() {
        let mut session = streaming();
        apply(&mut session, &ActionRecord::error("boom"));
        assert!(!session.continuation_available());
    }

    #[test]
    fn incomplete_finish_keeps_streaming() {
        let mut session = streaming();
        let record = ActionRecord::Finish {
            is_complete: false,
            suggestions: Vec::new(),
        };
        assert_eq!(apply(&mut session, &record), Applied::FinishPending);
        assert_eq!(session.status(), SessionStatus::Streaming);
    }

    #[test]
    fn finish_records_assistant_transcript_without_terminal_record() {
        let mut session = streaming();
        apply(&mut session, &ActionRecord::thinking("t"));
        apply(&mut session, &ActionRecord::create_file("a"));
        apply(&mut session, &ActionRecord::finish(vec!["next".to_owned()]));

        let last = session.history().last().expect("assistant turn");
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(
            last.text,
            format!(
                "{}\n{}\n",
                ActionRecord::thinking("t").to_wire(),
                ActionRecord::create_file("a").to_wire()
            )
        );
        assert_eq!(session.suggestions(), ["next".to_owned()]);
    }
}
