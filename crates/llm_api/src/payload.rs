use codegen_protocol::{HistoryTurn, Role};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Gemini content block (one conversation turn).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

impl GeminiContent {
    pub fn user(text: impl Into<String>) -> Self {
        Self::with_role("user", text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::with_role("model", text)
    }

    fn with_role(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: Some(role.to_owned()),
            parts: vec![GeminiPart::text(text)],
        }
    }

    /// System instruction block; Gemini omits the role here.
    pub fn instruction(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![GeminiPart::text(text)],
        }
    }
}

impl From<&HistoryTurn> for GeminiContent {
    fn from(turn: &HistoryTurn) -> Self {
        match turn.role {
            Role::User => Self::user(turn.text.clone()),
            Role::Assistant => Self::model(turn.text.clone()),
        }
    }
}

/// Gemini content part. Only the populated field is serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Set on reasoning parts, which are not assistant output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable_code: Option<ExecutableCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_execution_result: Option<CodeExecutionResult>,
}

impl GeminiPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn is_thought(&self) -> bool {
        self.thought.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutableCode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeExecutionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Request body for Gemini `streamGenerateContent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Value>,
}

impl GeminiRequest {
    /// Generation request: prior turns, then the new user prompt.
    pub fn generation(history: &[HistoryTurn], prompt: &str, instructions: &str) -> Self {
        let mut contents: Vec<GeminiContent> = history.iter().map(GeminiContent::from).collect();
        contents.push(GeminiContent::user(prompt));

        Self {
            contents,
            system_instruction: non_empty(instructions).map(GeminiContent::instruction),
            tools: Vec::new(),
        }
    }

    /// Request with the code-execution tool enabled.
    pub fn code_execution(contents: Vec<GeminiContent>) -> Self {
        Self {
            contents,
            system_instruction: None,
            tools: vec![json!({ "codeExecution": {} })],
        }
    }
}

/// OpenAI-compatible chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

impl From<&HistoryTurn> for ChatMessage {
    fn from(turn: &HistoryTurn) -> Self {
        let role = match turn.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        Self::new(role, turn.text.clone())
    }
}

/// Request body for OpenAI-compatible `chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Default: true.
    #[serde(default = "default_true")]
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

fn default_true() -> bool {
    true
}

impl ChatCompletionRequest {
    /// Generation request: system message, prior turns, then the new prompt.
    pub fn generation(
        model: impl Into<String>,
        history: &[HistoryTurn],
        prompt: &str,
        instructions: &str,
    ) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if let Some(instructions) = non_empty(instructions) {
            messages.push(ChatMessage::new("system", instructions));
        }
        messages.extend(history.iter().map(ChatMessage::from));
        messages.push(ChatMessage::new("user", prompt));

        Self {
            model: model.into(),
            messages,
            stream: true,
            temperature: None,
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
