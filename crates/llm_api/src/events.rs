use codegen_protocol::ExecutionPart;
use serde::Deserialize;
use serde_json::Value;

use crate::payload::GeminiContent;

/// Wire-level unit recovered from a provider stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamDelta {
    /// Assistant text to append to the action-record buffer.
    Text(String),
    /// Provider error envelope received mid-stream.
    Failure(Value),
}

/// One Gemini `GenerateContentResponse` chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated non-thought text of the first candidate.
    pub fn text(&self) -> String {
        self.first_content()
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|part| !part.is_thought())
                    .filter_map(|part| part.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Structured parts of the first candidate, for code-execution replies.
    pub fn execution_parts(&self) -> Vec<ExecutionPart> {
        let Some(content) = self.first_content() else {
            return Vec::new();
        };

        let mut parts = Vec::new();
        for part in &content.parts {
            if part.is_thought() {
                continue;
            }
            if let Some(text) = part.text.as_deref().filter(|text| !text.is_empty()) {
                parts.push(ExecutionPart::Text(text.to_owned()));
            }
            if let Some(code) = &part.executable_code {
                if let Some(source) = code.code.as_deref() {
                    parts.push(ExecutionPart::ExecutableCode {
                        language: code.language.clone(),
                        code: source.to_owned(),
                    });
                }
            }
            if let Some(result) = &part.code_execution_result {
                parts.push(ExecutionPart::CodeExecutionResult {
                    outcome: result.outcome.clone(),
                    output: result.output.clone(),
                });
            }
        }
        parts
    }

    fn first_content(&self) -> Option<&GeminiContent> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
    }
}

/// Returns the envelope itself when it reports a provider error.
pub fn error_envelope(value: &Value) -> Option<&Value> {
    value
        .get("error")
        .filter(|error| error.is_object() || error.is_string())
        .map(|_| value)
}

/// Text delta of a Gemini REST envelope: `candidates[0].content.parts[0].text`.
pub fn gemini_rest_text(value: &Value) -> Option<&str> {
    value
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
}

/// Text delta of an OpenAI-compatible envelope: `choices[0].delta.content`.
pub fn openai_delta_text(value: &Value) -> Option<&str> {
    value
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
}
