//! Command loop state: one runner, one store, one optional execution chat.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use codegen_protocol::{ActionRecord, ExecutionPart, ExecutionSession};
use codegen_studio::{
    Applied, GenerationRunner, GenerationSession, SessionStatus, Submission, SubmitError,
};
use futures_util::StreamExt;
use project_store::{
    archive_file_name, export_zip, import_archive, ProjectRecord, ProjectStore,
};

use crate::commands::{parse_slash_command, SlashCommand, HELP_TEXT};
use crate::materialize::write_project;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App<W: Write> {
    runner: GenerationRunner,
    store: ProjectStore,
    out_dir: PathBuf,
    execution: Option<Box<dyn ExecutionSession>>,
    out: W,
}

impl<W: Write> App<W> {
    pub fn new(runner: GenerationRunner, store: ProjectStore, out_dir: PathBuf, out: W) -> Self {
        Self {
            runner,
            store,
            out_dir,
            execution: None,
            out,
        }
    }

    pub fn runner(&self) -> &GenerationRunner {
        &self.runner
    }

    pub fn session(&self) -> &GenerationSession {
        self.runner.session()
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Handles one input line. Command failures are printed, not returned.
    pub async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        match self.dispatch(line).await {
            Ok(flow) => Ok(flow),
            Err(error) => {
                writeln!(self.out, "error: {error:#}")?;
                Ok(Flow::Continue)
            }
        }
    }

    async fn dispatch(&mut self, line: &str) -> Result<Flow> {
        let Some(command) = parse_slash_command(line) else {
            let prompt = line.trim();
            if !prompt.is_empty() {
                self.generate(Submission::Prompt(prompt.to_string())).await?;
            }
            return Ok(Flow::Continue);
        };

        match command {
            SlashCommand::New(prompt) => self.generate(Submission::Fresh(prompt)).await?,
            SlashCommand::Continue => self.generate(Submission::Continue).await?,
            SlashCommand::Tree => self.print_tree()?,
            SlashCommand::Cat(path) => self.cat(&path)?,
            SlashCommand::Touch(path) => {
                match self.runner.session_mut().create_file(&path) {
                    Some(path) => writeln!(self.out, "created {path}")?,
                    None => writeln!(self.out, "cannot create file at '{path}'")?,
                }
            }
            SlashCommand::Mkdir(path) => {
                match self.runner.session_mut().create_folder(&path) {
                    Some(path) => writeln!(self.out, "created {path}/")?,
                    None => writeln!(self.out, "cannot create folder at '{path}'")?,
                }
            }
            SlashCommand::Rm(path) => match self.runner.session_mut().delete_node(&path) {
                Some(removed) => writeln!(self.out, "removed {path} ({} files)", removed.len())?,
                None => writeln!(self.out, "no such path: {path}")?,
            },
            SlashCommand::Save => self.save()?,
            SlashCommand::Projects => self.list_projects()?,
            SlashCommand::Load(id) => {
                let record = self.store.load(&id)?;
                let name = record.name.clone();
                self.runner.session_mut().restore(record.into_restored());
                writeln!(self.out, "loaded {name}")?;
                self.print_tree()?;
            }
            SlashCommand::Export(path) => self.export(path.as_deref())?,
            SlashCommand::Import(path) => {
                let restored = import_archive(Path::new(&path))?;
                self.runner.session_mut().restore(restored);
                writeln!(
                    self.out,
                    "imported {} files",
                    self.session().project().contents().len()
                )?;
                self.print_tree()?;
            }
            SlashCommand::Write(dir) => {
                let dir = dir.map(PathBuf::from).unwrap_or_else(|| self.out_dir.clone());
                let report = write_project(self.session().project().contents(), &dir)?;
                writeln!(self.out, "wrote {} files to {}", report.written, dir.display())?;
                for path in report.skipped {
                    writeln!(self.out, "skipped unsafe path {path}")?;
                }
            }
            SlashCommand::Exec(message) => self.exec(&message).await?,
            SlashCommand::Help => writeln!(self.out, "{HELP_TEXT}")?,
            SlashCommand::Quit => return Ok(Flow::Quit),
            SlashCommand::Usage(usage) => writeln!(self.out, "usage: {usage}")?,
            SlashCommand::Unknown(command) => {
                writeln!(self.out, "unknown command {command}; try /help")?
            }
        }
        Ok(Flow::Continue)
    }

    async fn generate(&mut self, submission: Submission) -> Result<()> {
        let Self { runner, out, .. } = self;
        let mut write_error = None;
        let outcome = runner
            .submit(submission, |record, applied, _| {
                if let Err(error) = print_record(out, record, applied) {
                    write_error.get_or_insert(error);
                }
            })
            .await;
        if let Some(error) = write_error {
            return Err(error.into());
        }

        match outcome {
            Ok(status) => self.print_outcome(status),
            Err(SubmitError::MissingApiKey) => Err(anyhow!(
                "{}; set apiKey in the settings file or CODEGEN_API_KEY",
                SubmitError::MissingApiKey
            )),
            Err(error) => Err(error.into()),
        }
    }

    fn print_outcome(&mut self, status: SessionStatus) -> Result<()> {
        let session = self.runner.session();
        match status {
            SessionStatus::Finished => {
                if let Some(stats) = session.stats() {
                    writeln!(
                        self.out,
                        "done: {} files, {} lines, {} bytes in {:.1}s",
                        stats.total_files,
                        stats.total_lines,
                        stats.total_size,
                        stats.duration_ms as f64 / 1000.0
                    )?;
                }
                if !session.suggestions().is_empty() {
                    writeln!(self.out, "next ideas:")?;
                    for suggestion in session.suggestions() {
                        writeln!(self.out, "  - {suggestion}")?;
                    }
                }
            }
            SessionStatus::AwaitingContinuation => {
                writeln!(self.out, "generation stopped early; /continue to resume")?
            }
            SessionStatus::Errored if session.continuation_available() => {
                writeln!(self.out, "partial project kept; /continue to resume")?
            }
            SessionStatus::Idle => writeln!(self.out, "no output received")?,
            SessionStatus::Errored | SessionStatus::Streaming => {}
        }
        Ok(())
    }

    fn print_tree(&mut self) -> Result<()> {
        let tree = self.runner.session().project().tree();
        if tree.is_empty() {
            writeln!(self.out, "(empty project)")?;
        } else {
            write!(self.out, "{}", tree.render())?;
        }
        Ok(())
    }

    fn cat(&mut self, path: &str) -> Result<()> {
        let session = self.runner.session_mut();
        if !session.select_file(path) {
            writeln!(self.out, "no such file: {path}")?;
            return Ok(());
        }
        let content = session
            .selected_file()
            .and_then(|selected| session.project().read(selected))
            .unwrap_or_default();
        writeln!(self.out, "{content}")?;
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        let record = ProjectRecord::from_session(self.runner.session())?;
        let metadata = record.metadata();
        self.store.save(record)?;
        writeln!(self.out, "saved {} ({})", metadata.name, metadata.id)?;
        self.runner.session_mut().set_metadata(metadata);
        Ok(())
    }

    fn list_projects(&mut self) -> Result<()> {
        let records = self.store.list()?;
        if records.is_empty() {
            writeln!(self.out, "no saved projects")?;
        }
        for record in records {
            writeln!(
                self.out,
                "{}  {}  {}  ({} files)",
                record.id,
                record.created_at,
                record.name,
                record.file_contents.len()
            )?;
        }
        Ok(())
    }

    fn export(&mut self, path: Option<&str>) -> Result<()> {
        let session = self.runner.session();
        if session.project().contents().is_empty() {
            writeln!(self.out, "nothing to export")?;
            return Ok(());
        }
        let target = match path {
            Some(path) => PathBuf::from(path),
            None => self.out_dir.join(archive_file_name(session.prompt())),
        };
        let bytes = export_zip(session.project().contents())?;
        if let Some(parent) = target.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&target, bytes)
            .with_context(|| format!("failed to write {}", target.display()))?;
        writeln!(self.out, "exported {}", target.display())?;
        Ok(())
    }

    async fn exec(&mut self, message: &str) -> Result<()> {
        if self.execution.is_none() {
            let session = self.runner.start_execution().map_err(|error| anyhow!(error))?;
            self.execution = Some(session);
        }
        let Self { execution, out, .. } = self;
        let Some(session) = execution.as_mut() else {
            return Ok(());
        };

        let mut parts = session.send_message(message);
        while let Some(part) = parts.next().await {
            print_part(out, &part)?;
        }
        Ok(())
    }
}

fn print_record(out: &mut impl Write, record: &ActionRecord, applied: &Applied) -> std::io::Result<()> {
    match (record, applied) {
        (ActionRecord::Thinking { content }, _) => writeln!(out, "· {content}"),
        (_, Applied::FileCreated(path)) => writeln!(out, "+ {path}"),
        (ActionRecord::AppendToFile { content, .. }, Applied::Appended(path)) => {
            writeln!(out, "~ {path} (+{} bytes)", content.len())
        }
        (_, Applied::FinishPending) => writeln!(out, "model reported an incomplete finish"),
        (_, Applied::Failed(message)) => writeln!(out, "error: {message}"),
        _ => Ok(()),
    }
}

fn print_part(out: &mut impl Write, part: &ExecutionPart) -> std::io::Result<()> {
    match part {
        ExecutionPart::Text(text) => writeln!(out, "{text}"),
        ExecutionPart::ExecutableCode { language, code } => {
            let language = language.as_deref().unwrap_or_default().to_lowercase();
            writeln!(out, "```{language}\n{}\n```", code.trim_end())
        }
        ExecutionPart::CodeExecutionResult { outcome, output } => {
            let outcome = outcome.as_deref().unwrap_or("OUTCOME_UNSPECIFIED");
            writeln!(out, "[{outcome}]")?;
            match output {
                Some(output) if !output.is_empty() => writeln!(out, "{}", output.trim_end()),
                _ => Ok(()),
            }
        }
        ExecutionPart::Error(message) => writeln!(out, "error: {message}"),
    }
}
