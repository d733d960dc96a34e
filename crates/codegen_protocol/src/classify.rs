//! Provider failure classification.
//!
//! Every adapter funnels its failures through [`classify`], so the message a
//! user sees does not depend on which transport failed.

use serde_json::Value;

use crate::action::ActionRecord;

/// Advisory shown when a provider reports rate-limit or quota exhaustion.
pub const RATE_LIMIT_MESSAGE: &str = "The API rate limit was exceeded. The request couldn't be completed, even after automatic retries. Please check your plan and billing details, wait a few minutes, or try switching to a different provider in the settings.";

/// Fallback when a failure carries nothing usable.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred during code generation.";

/// Fallback when a failure payload cannot be printed.
pub const UNSERIALIZABLE_ERROR_MESSAGE: &str = "An unexpected and un-serializable error occurred.";

/// Raw provider failure, before classification.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderFailure {
    /// Bare string reported by a transport.
    Text(String),
    /// Exception-like failure (network, SDK, body decode) with its message.
    Exception(String),
    /// Structured payload such as a provider error envelope.
    Payload(Value),
}

impl ProviderFailure {
    /// Builds the payload for a non-success HTTP response.
    ///
    /// A JSON object body, or the first object of an array body (Gemini REST
    /// wraps errors as `[{"error":{...}}]`), contributes its fields; any other
    /// body becomes the `message` field. The transport `status` is inserted
    /// last so a body field of the same name cannot mask it.
    #[must_use]
    pub fn http(status: u16, body: &str) -> Self {
        let mut payload = serde_json::Map::new();

        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(fields)) => payload.extend(fields),
            Ok(Value::Array(items)) if matches!(items.first(), Some(Value::Object(_))) => {
                if let Some(Value::Object(fields)) = items.into_iter().next() {
                    payload.extend(fields);
                }
            }
            _ if !body.trim().is_empty() => {
                payload.insert("message".to_owned(), Value::from(body.trim()));
            }
            _ => {}
        }
        payload.insert("status".to_owned(), Value::from(status));

        Self::Payload(Value::Object(payload))
    }
}

/// User-facing classification of a [`ProviderFailure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub message: String,
    pub rate_limited: bool,
}

impl ClassifiedError {
    /// Terminal record reporting this failure on the action stream.
    #[must_use]
    pub fn into_record(self) -> ActionRecord {
        ActionRecord::error(self.message)
    }
}

/// Maps a provider failure to the message reported to the user.
#[must_use]
pub fn classify(failure: &ProviderFailure) -> ClassifiedError {
    match failure {
        ProviderFailure::Text(text) | ProviderFailure::Exception(text) => ClassifiedError {
            message: text.clone(),
            rate_limited: false,
        },
        ProviderFailure::Payload(value) if is_rate_limited(value) => ClassifiedError {
            message: RATE_LIMIT_MESSAGE.to_owned(),
            rate_limited: true,
        },
        ProviderFailure::Payload(value) => ClassifiedError {
            message: payload_message(value),
            rate_limited: false,
        },
    }
}

fn is_rate_limited(value: &Value) -> bool {
    if !value.is_object() {
        return false;
    }
    if value.get("status").and_then(Value::as_u64) == Some(429) {
        return true;
    }

    let Some(nested) = value.get("error").filter(|nested| nested.is_object()) else {
        return false;
    };
    nested.get("status").and_then(Value::as_str) == Some("RESOURCE_EXHAUSTED")
        || nested.get("code").and_then(Value::as_u64) == Some(429)
}

fn payload_message(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(fields) => {
            let nested_message = fields
                .get("error")
                .and_then(|nested| nested.get("message"))
                .and_then(display_text);
            if let Some(message) = nested_message {
                let status = fields
                    .get("error")
                    .and_then(|nested| nested.get("status"))
                    .and_then(display_text)
                    .unwrap_or_else(|| "Unknown".to_owned());
                return format!("API Error: {message} (Status: {status})");
            }

            if let Some(message) = fields.get("message").and_then(display_text) {
                return format!("API Error: {message}");
            }

            pretty_dump(value)
        }
        Value::Array(_) => pretty_dump(value),
        Value::Null | Value::Bool(_) | Value::Number(_) => UNKNOWN_ERROR_MESSAGE.to_owned(),
    }
}

fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn pretty_dump(value: &Value) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(dump) => format!("An unexpected error occurred. Full details:\n{dump}"),
        Err(_) => UNSERIALIZABLE_ERROR_MESSAGE.to_owned(),
    }
}
