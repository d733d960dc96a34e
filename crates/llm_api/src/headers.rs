use std::collections::BTreeMap;

use codegen_protocol::WireFormat;

use crate::config::LlmApiConfig;
use crate::error::LlmApiError;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_GOOG_API_KEY: &str = "x-goog-api-key";
pub const HEADER_USER_AGENT: &str = "user-agent";

/// Build a deterministic header map for a streaming request.
pub fn build_headers(
    config: &LlmApiConfig,
    wire: WireFormat,
) -> Result<BTreeMap<String, String>, LlmApiError> {
    let api_key = config.api_key.trim();
    if api_key.is_empty() {
        return Err(LlmApiError::MissingApiKey);
    }

    let mut headers = BTreeMap::new();
    match wire {
        WireFormat::GeminiSdk | WireFormat::GeminiRest => {
            headers.insert(HEADER_GOOG_API_KEY.to_owned(), api_key.to_owned());
        }
        WireFormat::OpenAiCompatible => {
            headers.insert(HEADER_AUTHORIZATION.to_owned(), format!("Bearer {api_key}"));
        }
    }

    let accept = match wire {
        WireFormat::GeminiRest => "application/json",
        WireFormat::GeminiSdk | WireFormat::OpenAiCompatible => "text/event-stream",
    };
    headers.insert(HEADER_ACCEPT.to_owned(), accept.to_owned());
    headers.insert(
        HEADER_CONTENT_TYPE.to_owned(),
        "application/json".to_owned(),
    );

    headers.insert(HEADER_USER_AGENT.to_owned(), default_user_agent());

    Ok(headers)
}

fn default_user_agent() -> String {
    format!(
        "codegen-studio/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        normalize_arch(std::env::consts::ARCH)
    )
}

fn normalize_arch(arch: &str) -> String {
    match arch.to_ascii_lowercase().as_str() {
        "x86_64" | "amd64" => "x64".to_owned(),
        "x86" | "i386" | "i686" => "ia32".to_owned(),
        "aarch64" => "arm64".to_owned(),
        normalized => normalized.to_owned(),
    }
}
