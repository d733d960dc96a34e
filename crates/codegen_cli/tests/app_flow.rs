use std::path::Path;
use std::sync::Arc;

use codegen_cli::app::{App, Flow};
use codegen_protocol::{ActionRecord, ProviderFailure};
use codegen_provider_mock::{MockProvider, MockStep};
use codegen_studio::{GenerationRunner, SessionStatus};
use project_store::{projects_file, ProjectStore};

fn app_with(provider: MockProvider, dir: &Path) -> App<Vec<u8>> {
    let runner = GenerationRunner::new(Arc::new(provider));
    let store = ProjectStore::open(projects_file(dir));
    App::new(runner, store, dir.join("out"), Vec::new())
}

fn take_output(app: &mut App<Vec<u8>>) -> String {
    String::from_utf8(std::mem::take(app.output_mut())).expect("utf8 output")
}

#[tokio::test]
async fn prompt_streams_events_and_prints_summary() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut app = app_with(MockProvider::default(), temp.path());

    let flow = app.handle_line("a landing page").await.expect("handle");
    assert_eq!(flow, Flow::Continue);

    let output = take_output(&mut app);
    assert!(output.contains("· Plan a static landing page"));
    assert!(output.contains("+ css/style.css"));
    assert!(output.contains("~ deploy.sh"));
    assert!(output.contains("done: 3 files"));
    assert!(output.contains("  - Add dark mode"));
    assert_eq!(app.session().status(), SessionStatus::Finished);

    app.handle_line("/tree").await.expect("tree");
    assert_eq!(
        take_output(&mut app),
        "css/\n  style.css\ndeploy.sh\nindex.html\n"
    );
}

#[tokio::test]
async fn manual_edits_and_cat() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut app = app_with(MockProvider::default(), temp.path());

    app.handle_line("/mkdir assets/img").await.expect("mkdir");
    app.handle_line("/touch notes.md").await.expect("touch");
    app.handle_line("/cat notes.md").await.expect("cat");
    app.handle_line("/rm assets").await.expect("rm");
    app.handle_line("/rm missing").await.expect("rm missing");

    let output = take_output(&mut app);
    assert!(output.contains("created assets/img/"));
    assert!(output.contains("created notes.md"));
    assert!(output.contains("removed assets (0 files)"));
    assert!(output.contains("no such path: missing"));
    assert_eq!(app.session().selected_file(), Some("notes.md"));
    assert!(app.session().project().tree().find("assets").is_none());
}

#[tokio::test]
async fn cat_prints_content_for_unnormalized_path() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut app = app_with(MockProvider::default(), temp.path());

    app.handle_line("a landing page").await.expect("generate");
    take_output(&mut app);

    app.handle_line("/cat /css//style.css").await.expect("cat");
    assert_eq!(
        take_output(&mut app),
        "body {\n  font-family: sans-serif;\n  margin: 2rem;\n}\n\n"
    );
    assert_eq!(app.session().selected_file(), Some("css/style.css"));
}

#[tokio::test]
async fn save_list_and_load_round_trip_through_store() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut app = app_with(MockProvider::default(), temp.path());

    app.handle_line("a landing page").await.expect("generate");
    app.handle_line("/save").await.expect("save");
    let id = app
        .session()
        .metadata()
        .map(|metadata| metadata.id.clone())
        .expect("metadata after save");

    app.handle_line("/new something else").await.expect("fresh");
    app.handle_line("/projects").await.expect("list");
    app.handle_line(&format!("/load {id}")).await.expect("load");
    let output = take_output(&mut app);

    assert!(output.contains(&format!("{id}  ")));
    assert!(output.contains("loaded a landing page"));
    assert_eq!(app.session().prompt(), "a landing page");
    assert!(app.session().history().is_empty());

    app.handle_line("/load nope").await.expect("load unknown");
    assert!(take_output(&mut app).contains("error: project 'nope' not found"));
}

#[tokio::test]
async fn export_import_and_write_files() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut app = app_with(MockProvider::default(), temp.path());
    app.handle_line("my site").await.expect("generate");

    app.handle_line("/export").await.expect("export");
    let archive = temp.path().join("out").join("my-site.zip");
    assert!(archive.is_file());

    app.handle_line(&format!("/import {}", archive.display()))
        .await
        .expect("import");
    assert_eq!(app.session().prompt(), "Project loaded from my-site.zip");
    assert_eq!(app.session().project().contents().len(), 3);

    let site = temp.path().join("site");
    app.handle_line(&format!("/write {}", site.display()))
        .await
        .expect("write");
    assert!(site.join("css/style.css").is_file());
    assert!(take_output(&mut app).contains("wrote 3 files"));
}

#[tokio::test]
async fn failed_generation_offers_continue() {
    let temp = tempfile::tempdir().expect("tempdir");
    let provider = MockProvider::new(vec![
        MockStep::Record(ActionRecord::create_file("a.txt")),
        MockStep::Record(ActionRecord::append_to_file("a.txt", "partial")),
        MockStep::Fail(ProviderFailure::http(503, "upstream unavailable")),
    ]);
    let mut app = app_with(provider, temp.path());

    app.handle_line("build it").await.expect("generate");
    let output = take_output(&mut app);
    assert!(output.contains("+ a.txt"));
    assert!(output.contains("error: "));
    assert!(output.contains("/continue to resume"));
    assert_eq!(app.session().status(), SessionStatus::Errored);
}

#[tokio::test]
async fn unsupported_exec_and_usage_messages() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut app = app_with(MockProvider::default(), temp.path());

    app.handle_line("/exec print(1)").await.expect("exec");
    app.handle_line("/cat").await.expect("usage");
    app.handle_line("/continue").await.expect("continue");
    app.handle_line("/frobnicate").await.expect("unknown");
    let output = take_output(&mut app);

    assert!(output.contains("error: Code execution is not supported by this provider"));
    assert!(output.contains("usage: /cat <path>"));
    assert!(output.contains("error: no active generation session to continue"));
    assert!(output.contains("unknown command /frobnicate"));

    assert_eq!(app.handle_line("/quit").await.expect("quit"), Flow::Quit);
}

#[tokio::test]
async fn missing_api_key_is_reported_before_streaming() {
    let temp = tempfile::tempdir().expect("tempdir");
    let provider = Arc::new(MockProvider::default());
    let runner = GenerationRunner::new(provider.clone()).with_api_key_configured(false);
    let mut app = App::new(
        runner,
        ProjectStore::open(projects_file(temp.path())),
        temp.path().to_path_buf(),
        Vec::new(),
    );

    app.handle_line("a page").await.expect("handle");
    assert!(take_output(&mut app).contains("error: API key is not configured"));
    assert!(provider.calls().is_empty());
}
