//! Provider settings resolution for the CLI.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use codegen_protocol::ProviderSettings;

pub const SETTINGS_PATH_ENV: &str = "CODEGEN_SETTINGS_PATH";
pub const API_KEY_ENV: &str = "CODEGEN_API_KEY";
pub const PROVIDER_ENV: &str = "CODEGEN_PROVIDER";
pub const MOCK_PROVIDER: &str = "mock";

const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderChoice {
    Mock,
    Configured(ProviderSettings),
}

/// Where settings came from, for the startup banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsOrigin {
    File(PathBuf),
    Defaults,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSettings {
    pub choice: ProviderChoice,
    pub origin: SettingsOrigin,
}

/// Environment lookups, injectable for tests.
pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

pub struct ProcessEnv;

impl Env for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|value| !value.trim().is_empty())
    }
}

/// `--settings`, then `CODEGEN_SETTINGS_PATH`, then the config-dir file.
/// An explicitly named file must exist; the config-dir file is optional.
pub fn load_settings(
    explicit: Option<&Path>,
    config_dir: Option<&Path>,
    env: &dyn Env,
) -> Result<LoadedSettings> {
    let explicit = explicit
        .map(Path::to_path_buf)
        .or_else(|| env.var(SETTINGS_PATH_ENV).map(PathBuf::from));

    let (mut settings, origin) = match explicit {
        Some(path) => (read_settings_file(&path)?, SettingsOrigin::File(path)),
        None => match config_dir.map(default_settings_path) {
            Some(path) if path.is_file() => {
                (read_settings_file(&path)?, SettingsOrigin::File(path))
            }
            _ => (ProviderSettings::default(), SettingsOrigin::Defaults),
        },
    };

    if let Some(api_key) = env.var(API_KEY_ENV) {
        settings.api_key = api_key;
    }

    let choice = match env.var(PROVIDER_ENV) {
        Some(value) if value.trim().eq_ignore_ascii_case(MOCK_PROVIDER) => ProviderChoice::Mock,
        Some(value) => bail!("{PROVIDER_ENV} must be '{MOCK_PROVIDER}' when set, got '{value}'"),
        None => ProviderChoice::Configured(settings),
    };

    Ok(LoadedSettings { choice, origin })
}

#[must_use]
pub fn default_settings_path(config_dir: &Path) -> PathBuf {
    project_store::store_root(config_dir).join(SETTINGS_FILE_NAME)
}

fn read_settings_file(path: &Path) -> Result<ProviderSettings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    let settings: ProviderSettings = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse settings file {}", path.display()))?;
    if settings.timeout_sec == Some(0) {
        bail!("timeoutSec must be > 0 in {}", path.display());
    }
    Ok(settings)
}
