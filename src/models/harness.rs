//! Harness data models
//!
//! Types exchanged between the evaluation harness and every adapter

use serde::{Deserialize, Serialize};

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// Message content (plain text or a list of parts)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatContent {
    /// Simple text content
    Text(String),
    /// Content parts
    Parts(Vec<ContentPart>),
}

/// One part of a multi-part message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    Image { image: String },
}

impl ChatContent {
    /// Text view of the content; text parts are joined with a single space
    pub fn text(&self) -> String {
        match self {
            ChatContent::Text(text) => text.clone(),
            ChatContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::Image { .. } => None,
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl From<&str> for ChatContent {
    fn from(text: &str) -> Self {
        ChatContent::Text(text.to_string())
    }
}

impl From<String> for ChatContent {
    fn from(text: String) -> Self {
        ChatContent::Text(text)
    }
}

/// Chat message passed in by the harness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: ChatContent,
}

impl ChatMessage {
    pub fn system(content: impl Into<ChatContent>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<ChatContent>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<ChatContent>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    /// Text of the message
    pub fn text(&self) -> String {
        self.content.text()
    }
}

/// Tool description offered by the harness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

/// Tool selection policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    #[default]
    Auto,
    Any,
    None,
    Function(String),
}

/// Per-call generation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Maximum tokens to generate (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Temperature parameter (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Top-p parameter (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Overall time limit for one generation, in seconds (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Retry budget for backends that retry internally (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

/// Why generation stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Stop,
    MaxTokens,
    ToolCalls,
    ContentFilter,
    #[default]
    Unknown,
}

impl StopReason {
    /// Map a provider finish reason onto the harness classification
    pub fn from_finish_reason(reason: Option<&str>) -> Self {
        match reason {
            Some("stop") | Some("end_turn") => StopReason::Stop,
            Some("length") | Some("max_tokens") => StopReason::MaxTokens,
            Some("tool_calls") => StopReason::ToolCalls,
            Some("content_filter") => StopReason::ContentFilter,
            _ => StopReason::Unknown,
        }
    }
}

/// Assistant message produced by a generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageAssistant {
    pub content: String,
    pub source: String,
}

impl ChatMessageAssistant {
    pub fn generated(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: "generate".to_string(),
        }
    }
}

/// One completion choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChoice {
    pub message: ChatMessageAssistant,
    #[serde(default)]
    pub stop_reason: StopReason,
}

/// Token usage reported by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

/// Result of one generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub model: String,
    pub choices: Vec<ChatCompletionChoice>,
    /// Absent when the backend does not report usage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<ModelUsage>,
    /// Wall-clock seconds spent generating
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
}

impl ModelOutput {
    /// Text of the first choice
    pub fn completion(&self) -> &str {
        self.choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts_joined_with_single_space() {
        let content = ChatContent::Parts(vec![
            ContentPart::Text { text: "first".to_string() },
            ContentPart::Image { image: "data:image/png;base64,AAAA".to_string() },
            ContentPart::Text { text: "second".to_string() },
        ]);
        assert_eq!(content.text(), "first second");
    }

    #[test]
    fn test_message_deserialization() {
        let message: ChatMessage = serde_json::from_str(
            r#"{"role": "user", "content": [{"type": "text", "text": "a"}, {"type": "text", "text": "b"}]}"#,
        )
        .unwrap();
        assert_eq!(message.role, Role::User);
        assert_eq!(message.text(), "a b");

        let message: ChatMessage = serde_json::from_str(r#"{"role": "system", "content": "plain"}"#).unwrap();
        assert_eq!(message.text(), "plain");
    }

    #[test]
    fn test_stop_reason_mapping() {
        assert_eq!(StopReason::from_finish_reason(Some("stop")), StopReason::Stop);
        assert_eq!(StopReason::from_finish_reason(Some("length")), StopReason::MaxTokens);
        assert_eq!(StopReason::from_finish_reason(Some("tool_calls")), StopReason::ToolCalls);
        assert_eq!(StopReason::from_finish_reason(Some("content_filter")), StopReason::ContentFilter);
        assert_eq!(StopReason::from_finish_reason(Some("eos")), StopReason::Unknown);
        assert_eq!(StopReason::from_finish_reason(None), StopReason::Unknown);
    }

    #[test]
    fn test_output_without_usage_omits_field() {
        let output = ModelOutput {
            model: "eai-stream".to_string(),
            choices: vec![ChatCompletionChoice {
                message: ChatMessageAssistant::generated("Hello"),
                stop_reason: StopReason::Unknown,
            }],
            usage: None,
            time: None,
        };

        let json = serde_json::to_value(&output).unwrap();
        assert!(json.get("usage").is_none());
        assert_eq!(json["choices"][0]["message"]["source"], "generate");
        assert_eq!(json["choices"][0]["stop_reason"], "unknown");
        assert_eq!(output.completion(), "Hello");
    }
}
