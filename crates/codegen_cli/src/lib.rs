//! Interactive terminal front end for codegen studio.
//!
//! ## Provider bootstrap
//!
//! Settings are a camelCase JSON document:
//!
//! ```json
//! {
//!   "provider": "Google",
//!   "apiKey": "<key>",
//!   "model": "gemini-2.5-flash",
//!   "baseUrl": "https://proxy.example/v1beta",
//!   "timeoutSec": 120
//! }
//! ```
//!
//! - `provider` is one of `Google`, `AvalAI`, `GapGPT`, `TalkBot`.
//! - `baseUrl` and `timeoutSec` are optional; `timeoutSec` must be > 0.
//! - Unknown JSON fields are rejected.
//!
//! The file is read from `--settings`, else `CODEGEN_SETTINGS_PATH`, else
//! `<config dir>/codegen-studio/settings.json`. `CODEGEN_API_KEY` overrides
//! the key, and `CODEGEN_PROVIDER=mock` replays a canned project offline.

pub mod app;
pub mod commands;
pub mod logging;
pub mod materialize;
pub mod settings;
