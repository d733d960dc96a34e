use codegen_protocol::ProviderKind;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_AVALAI_BASE_URL: &str = "https://api.avalai.ir/v1beta";
pub const DEFAULT_GAPGPT_BASE_URL: &str = "https://api.gapgpt.app/v1";
pub const DEFAULT_TALKBOT_BASE_URL: &str = "https://api.talkbot.ir/v1";

/// Default endpoint base for a provider.
pub fn default_base_url(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Google => DEFAULT_GEMINI_BASE_URL,
        ProviderKind::AvalAI => DEFAULT_AVALAI_BASE_URL,
        ProviderKind::GapGPT => DEFAULT_GAPGPT_BASE_URL,
        ProviderKind::TalkBot => DEFAULT_TALKBOT_BASE_URL,
    }
}

/// Gemini streaming endpoint for `model` under `base`.
///
/// `sse` selects the server-sent-events framing (`alt=sse`); without it the
/// body is a streamed JSON array of response envelopes.
pub fn gemini_stream_url(base: &str, model: &str, sse: bool) -> String {
    let base = base.trim().trim_end_matches('/');
    let model = model.trim().trim_start_matches("models/");
    let mut url = format!("{base}/models/{model}:streamGenerateContent");
    if sse {
        url.push_str("?alt=sse");
    }
    url
}

/// Normalize a base URL to an OpenAI-compatible chat-completions endpoint.
///
/// Normalization rules:
/// 1) keep `/chat/completions` unchanged
/// 2) append `/completions` when path ends in `/chat`
/// 3) append `/chat/completions` otherwise
pub fn normalize_chat_completions_url(input: &str) -> String {
    let trimmed = input.trim().trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        return trimmed.to_string();
    }
    if trimmed.ends_with("/chat") {
        return format!("{trimmed}/completions");
    }
    format!("{trimmed}/chat/completions")
}
