use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use codegen_cli::app::{App, Flow};
use codegen_cli::logging;
use codegen_cli::settings::{load_settings, ProcessEnv, ProviderChoice, SettingsOrigin};
use codegen_protocol::GenerationProvider;
use codegen_provider_llm::provider_for_settings;
use codegen_provider_mock::MockProvider;
use codegen_studio::{CancelSignal, GenerationRunner};
use project_store::{projects_file, store_root, ProjectStore};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "codegen")]
#[command(about = "Generate multi-file projects from a description with a streaming LLM")]
#[command(version)]
struct Args {
    /// Provider settings JSON file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Default directory for /write and /export
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let config_dir = dirs::config_dir();
    let loaded = load_settings(args.settings.as_deref(), config_dir.as_deref(), &ProcessEnv)?;

    let (provider, api_key_configured): (Arc<dyn GenerationProvider>, bool) = match &loaded.choice {
        ProviderChoice::Mock => (Arc::new(MockProvider::default().paced()), true),
        ProviderChoice::Configured(settings) => (
            provider_for_settings(settings).context("failed to build provider")?,
            settings.has_api_key(),
        ),
    };
    let profile = provider.profile();

    let store_dir = config_dir
        .as_deref()
        .map(store_root)
        .unwrap_or_else(|| args.out.join(".codegen-studio"));
    let store = ProjectStore::open(projects_file(&store_dir));

    let runner = GenerationRunner::new(provider).with_api_key_configured(api_key_configured);
    spawn_interrupt_listener(runner.cancel_signal());

    let mut app = App::new(runner, store, args.out, std::io::stdout());
    {
        let out = app.output_mut();
        writeln!(out, "codegen studio ({} / {})", profile.provider_id, profile.model_id)?;
        if let SettingsOrigin::File(path) = &loaded.origin {
            writeln!(out, "settings: {}", path.display())?;
        }
        if !api_key_configured {
            writeln!(out, "warning: no API key configured")?;
        }
        writeln!(out, "type /help for commands")?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        write!(app.output_mut(), "> ")?;
        app.output_mut().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if app.handle_line(&line).await? == Flow::Quit {
            break;
        }
    }

    Ok(())
}

/// Ctrl-C abandons the running generation instead of exiting.
fn spawn_interrupt_listener(cancel: CancelSignal) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            cancel.store(true, Ordering::Release);
        }
    });
}
