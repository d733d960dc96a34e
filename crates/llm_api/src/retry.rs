use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

/// Retry attempts allowed after the initial request.
pub const MAX_RETRIES: u32 = 3;
/// Delay before the first retry; doubles on each later attempt.
pub const BASE_DELAY_MS: u64 = 1000;

fn transient_error_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(
            r"(?i)rate.?limit|resource.?exhausted|overloaded|service.?unavailable|upstream.?connect|connection.?refused",
        )
        .expect("retry regex must compile")
    })
}

/// Whether a non-success HTTP response is worth another attempt.
pub fn is_retryable_http_error(status: u16, body: &str) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504) || transient_error_regex().is_match(body)
}

/// Whether a transport failure (no response at all) is worth another attempt.
pub fn is_retryable_transport_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || transient_error_regex().is_match(&error.to_string())
}

/// Exponential backoff for the given zero-based retry attempt.
pub fn backoff_delay(attempt: u32) -> Duration {
    let exponent = attempt.min(16);
    Duration::from_millis(BASE_DELAY_MS.saturating_mul(2u64.saturating_pow(exponent)))
}
