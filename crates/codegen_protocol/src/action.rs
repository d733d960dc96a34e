use serde::{Deserialize, Serialize};

/// One decoded unit of the generation protocol.
///
/// The wire form is a single JSON object tagged by `action`:
///
/// ```json
/// {"action":"THINKING","content":"plan the layout"}
/// {"action":"CREATE_FILE","filePath":"src/main.rs"}
/// {"action":"APPEND_TO_FILE","filePath":"src/main.rs","content":"fn main() {}\n"}
/// {"action":"FINISH","isComplete":true,"suggestions":["Add tests"]}
/// {"action":"ERROR","error":"model refused"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionRecord {
    Thinking {
        content: String,
    },
    CreateFile {
        #[serde(rename = "filePath")]
        file_path: String,
    },
    AppendToFile {
        #[serde(rename = "filePath")]
        file_path: String,
        content: String,
    },
    Finish {
        #[serde(rename = "isComplete", default)]
        is_complete: bool,
        #[serde(default)]
        suggestions: Vec<String>,
    },
    Error {
        #[serde(rename = "error")]
        message: String,
    },
}

impl ActionRecord {
    #[must_use]
    pub fn thinking(content: impl Into<String>) -> Self {
        Self::Thinking {
            content: content.into(),
        }
    }

    #[must_use]
    pub fn create_file(file_path: impl Into<String>) -> Self {
        Self::CreateFile {
            file_path: file_path.into(),
        }
    }

    #[must_use]
    pub fn append_to_file(file_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self::AppendToFile {
            file_path: file_path.into(),
            content: content.into(),
        }
    }

    #[must_use]
    pub fn finish(suggestions: Vec<String>) -> Self {
        Self::Finish {
            is_complete: true,
            suggestions,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Returns true for records that end a generation call.
    ///
    /// An incomplete `FINISH` leaves the call open.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Finish {
                is_complete: true,
                ..
            } | Self::Error { .. }
        )
    }

    /// Serializes the record back to its single-line wire form.
    #[must_use]
    pub fn to_wire(&self) -> String {
        // Every variant is a plain struct of strings/bools; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Decodes one frame into a record.
    pub fn from_frame(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }
}
