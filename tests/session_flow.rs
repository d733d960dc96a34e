use std::sync::Arc;
use std::time::Duration;

use codegen_protocol::{ActionRecord, GenerationProvider, ProviderFailure, Role};
use codegen_provider_mock::{MockProvider, MockStep};
use codegen_studio::{
    Applied, GenerationRunner, SessionStatus, Submission, SubmitError, CONTINUATION_PROMPT,
};

fn steps(records: Vec<ActionRecord>) -> Vec<MockStep> {
    records.into_iter().map(MockStep::Record).collect()
}

fn runner_with(provider: &Arc<MockProvider>) -> GenerationRunner {
    GenerationRunner::new(Arc::clone(provider) as Arc<dyn GenerationProvider>)
}

#[tokio::test]
async fn fresh_generation_reaches_finished_with_history() {
    let provider = Arc::new(MockProvider::new(steps(vec![
        ActionRecord::thinking("plan"),
        ActionRecord::create_file("index.html"),
        ActionRecord::append_to_file("index.html", "<p>{x}</p>"),
        ActionRecord::finish(vec!["Add CSS".to_owned()]),
    ])));
    let mut runner = runner_with(&provider);

    let mut applied = Vec::new();
    let status = runner
        .submit(Submission::Prompt("landing page".to_owned()), |_, effect, _| {
            applied.push(effect.clone())
        })
        .await
        .expect("submission should run");

    assert_eq!(status, SessionStatus::Finished);
    assert_eq!(
        applied,
        vec![
            Applied::Thought,
            Applied::FileCreated("index.html".to_owned()),
            Applied::Appended("index.html".to_owned()),
            Applied::Finished,
        ]
    );
    let session = runner.session();
    assert_eq!(session.project().read("index.html"), Some("<p>{x}</p>"));
    assert_eq!(session.selected_file(), Some("index.html"));
    assert_eq!(session.suggestions(), ["Add CSS".to_owned()]);
    assert_eq!(session.history().len(), 2);
    assert_eq!(session.history()[0].text, "landing page");
    assert_eq!(session.history()[1].role, Role::Assistant);
}

#[tokio::test]
async fn error_after_partial_output_allows_continue_without_reset() {
    let provider = Arc::new(MockProvider::scripted(
        vec![
            vec![
                MockStep::Record(ActionRecord::create_file("a.txt")),
                MockStep::Record(ActionRecord::append_to_file("a.txt", "one")),
                MockStep::Fail(ProviderFailure::Exception("network down".to_owned())),
            ],
            steps(vec![
                ActionRecord::append_to_file("a.txt", " two"),
                ActionRecord::finish(Vec::new()),
            ]),
        ],
        Vec::new(),
    ));
    let mut runner = runner_with(&provider);

    let status = runner
        .submit(Submission::Prompt("txt".to_owned()), |_, _, _| {})
        .await
        .expect("first call");
    assert_eq!(status, SessionStatus::Errored);
    assert_eq!(runner.session().last_error(), Some("network down"));
    assert!(runner.session().continuation_available());

    let status = runner
        .submit(Submission::Continue, |_, _, _| {})
        .await
        .expect("continuation");
    assert_eq!(status, SessionStatus::Finished);
    assert_eq!(runner.session().project().read("a.txt"), Some("one two"));

    let calls = provider.calls();
    assert_eq!(calls[1].prompt, CONTINUATION_PROMPT);
    assert_eq!(calls[1].history_len, 1);
}

#[tokio::test]
async fn stream_without_finish_awaits_continuation() {
    let provider = Arc::new(MockProvider::new(steps(vec![ActionRecord::create_file(
        "half.rs",
    )])));
    let mut runner = runner_with(&provider);

    let status = runner
        .submit(Submission::Prompt("x".to_owned()), |_, _, _| {})
        .await
        .expect("call");
    assert_eq!(status, SessionStatus::AwaitingContinuation);
    assert!(runner.session().continuation_available());
    assert_eq!(runner.session().history().len(), 2);
}

#[tokio::test]
async fn empty_stream_returns_to_idle() {
    let provider = Arc::new(MockProvider::new(Vec::new()));
    let mut runner = runner_with(&provider);

    let status = runner
        .submit(Submission::Prompt("x".to_owned()), |_, _, _| {})
        .await
        .expect("call");
    assert_eq!(status, SessionStatus::Idle);
}

#[tokio::test]
async fn new_prompt_after_finish_updates_existing_project() {
    let provider = Arc::new(MockProvider::scripted(
        vec![
            steps(vec![
                ActionRecord::create_file("app.js"),
                ActionRecord::append_to_file("app.js", "let n = 0;"),
                ActionRecord::finish(Vec::new()),
            ]),
            steps(vec![
                ActionRecord::create_file("reset.js"),
                ActionRecord::finish(Vec::new()),
            ]),
        ],
        Vec::new(),
    ));
    let mut runner = runner_with(&provider);

    runner
        .submit(Submission::Prompt("counter".to_owned()), |_, _, _| {})
        .await
        .expect("first call");
    runner
        .submit(Submission::Prompt("add reset".to_owned()), |_, _, _| {})
        .await
        .expect("update call");

    let calls = provider.calls();
    assert_eq!(calls[1].history_len, 0);
    assert!(calls[1].prompt.contains("counter"));
    assert!(calls[1].prompt.contains("add reset"));
    assert!(calls[1].prompt.contains("let n = 0;"));

    let project = runner.session().project();
    assert_eq!(project.read("app.js"), Some("let n = 0;"));
    assert_eq!(project.read("reset.js"), Some(""));
    assert_eq!(runner.session().prompt(), "counter");
}

#[tokio::test]
async fn fresh_submission_resets_project() {
    let provider = Arc::new(MockProvider::scripted(
        vec![
            steps(vec![
                ActionRecord::create_file("old.txt"),
                ActionRecord::finish(Vec::new()),
            ]),
            steps(vec![
                ActionRecord::create_file("new.txt"),
                ActionRecord::finish(Vec::new()),
            ]),
        ],
        Vec::new(),
    ));
    let mut runner = runner_with(&provider);

    runner
        .submit(Submission::Prompt("one".to_owned()), |_, _, _| {})
        .await
        .expect("first");
    runner
        .submit(Submission::Fresh("two".to_owned()), |_, _, _| {})
        .await
        .expect("second");

    let session = runner.session();
    assert_eq!(session.project().read("old.txt"), None);
    assert_eq!(session.project().read("new.txt"), Some(""));
    assert_eq!(session.prompt(), "two");
    assert_eq!(provider.calls()[1].prompt, "two");
}

#[tokio::test]
async fn missing_api_key_fails_before_any_call() {
    let provider = Arc::new(MockProvider::default());
    let mut runner = runner_with(&provider).with_api_key_configured(false);

    let error = runner
        .submit(Submission::Prompt("x".to_owned()), |_, _, _| {})
        .await
        .expect_err("missing key");
    assert_eq!(error, SubmitError::MissingApiKey);
    assert_eq!(error.to_string(), "API key is not configured");
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn cancel_keeps_applied_output_and_offers_continue() {
    let provider = Arc::new(
        MockProvider::default()
            .with_chunk_chars(4)
            .with_token_delay(Duration::from_millis(5)),
    );
    let mut runner = runner_with(&provider);
    let cancel = runner.cancel_signal();

    let mut seen = 0usize;
    let status = runner
        .submit(Submission::Prompt("demo".to_owned()), |_, _, _| {
            seen += 1;
            if seen == 3 {
                cancel.store(true, std::sync::atomic::Ordering::Release);
            }
        })
        .await
        .expect("call");

    assert_eq!(seen, 3);
    assert_eq!(status, SessionStatus::AwaitingContinuation);
    assert_eq!(runner.session().project().read("index.html"), Some(""));
}
