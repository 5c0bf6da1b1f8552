//! Streaming endpoint wire models
//!
//! Control-plane response, outbound request frame and inbound frames

use crate::utils::error::{helpers::protocol_error, AdapterResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Command sent with every outbound request
pub const STREAMING_COMMAND: &str = "STREAMING";

/// Opaque conversation identifier allocated by the control plane
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Control-plane response to `POST /conversations/new`
#[derive(Debug, Deserialize)]
pub struct NewConversationResponse {
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Bot selector inside the outbound frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotSelector {
    pub version: String,
}

/// User content inside the outbound frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContent {
    pub text: String,
}

/// Request frame written once per exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundRequest {
    pub conversation_id: ConversationId,
    pub bot: BotSelector,
    pub user_content: UserContent,
    pub command: String,
}

impl OutboundRequest {
    /// Build a streaming request
    pub fn streaming(
        conversation_id: ConversationId,
        model_selector: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id,
            bot: BotSelector { version: model_selector.into() },
            user_content: UserContent { text: text.into() },
            command: STREAMING_COMMAND.to_string(),
        }
    }
}

/// Status of an inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameStatus {
    More,
    Done,
    Error,
    /// Any status the endpoint is not known to send
    Other(String),
}

impl From<&str> for FrameStatus {
    fn from(status: &str) -> Self {
        match status {
            "more" => FrameStatus::More,
            "done" => FrameStatus::Done,
            "error" => FrameStatus::Error,
            other => FrameStatus::Other(other.to_string()),
        }
    }
}

/// Inbound frame as it appears on the wire
#[derive(Debug, Deserialize)]
struct WireFrame {
    status: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// Parsed inbound frame
#[derive(Debug, Clone, PartialEq)]
pub struct InboundFrame {
    pub status: FrameStatus,
    /// Present for `more` frames
    pub content: Option<String>,
    /// Original message text, kept for diagnostics
    pub raw: String,
}

impl InboundFrame {
    pub fn more(content: impl Into<String>) -> Self {
        let content = content.into();
        let raw = serde_json::json!({"status": "more", "content": content}).to_string();
        Self { status: FrameStatus::More, content: Some(content), raw }
    }

    pub fn done() -> Self {
        Self { status: FrameStatus::Done, content: None, raw: r#"{"status":"done"}"#.to_string() }
    }

    pub fn error(raw: impl Into<String>) -> Self {
        Self { status: FrameStatus::Error, content: None, raw: raw.into() }
    }

    /// Deserialize one inbound message
    pub fn parse(raw: &str) -> AdapterResult<Self> {
        let wire: WireFrame = serde_json::from_str(raw)
            .map_err(|e| protocol_error(format!("Malformed frame: {}", e), raw))?;

        let status = match wire.status {
            Some(status) => FrameStatus::from(status.as_str()),
            None => return Err(protocol_error("Frame is missing `status`", raw)),
        };

        if status == FrameStatus::More && wire.content.is_none() {
            return Err(protocol_error("`more` frame is missing `content`", raw));
        }

        Ok(Self {
            status,
            content: wire.content,
            raw: raw.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::AdapterError;

    #[test]
    fn test_outbound_wire_shape() {
        let request = OutboundRequest::streaming(ConversationId::new("conv-1"), "v2", "What is AI?");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "conversation_id": "conv-1",
                "bot": {"version": "v2"},
                "user_content": {"text": "What is AI?"},
                "command": "STREAMING"
            })
        );
    }

    #[test]
    fn test_parse_statuses() {
        let frame = InboundFrame::parse(r#"{"status": "more", "content": "Hel"}"#).unwrap();
        assert_eq!(frame.status, FrameStatus::More);
        assert_eq!(frame.content.as_deref(), Some("Hel"));

        let frame = InboundFrame::parse(r#"{"status": "done"}"#).unwrap();
        assert_eq!(frame.status, FrameStatus::Done);

        let frame = InboundFrame::parse(r#"{"status": "error", "content": "quota"}"#).unwrap();
        assert_eq!(frame.status, FrameStatus::Error);

        let frame = InboundFrame::parse(r#"{"status": "paused"}"#).unwrap();
        assert_eq!(frame.status, FrameStatus::Other("paused".to_string()));
    }

    #[test]
    fn test_parse_keeps_whitespace_in_content() {
        let frame = InboundFrame::parse(r#"{"status": "more", "content": " world\n"}"#).unwrap();
        assert_eq!(frame.content.as_deref(), Some(" world\n"));
    }

    #[test]
    fn test_parse_rejects_malformed_frames() {
        for raw in ["not json", r#"{"content": "x"}"#, r#"{"status": "more"}"#, "[]"] {
            match InboundFrame::parse(raw) {
                Err(AdapterError::Protocol { payload, .. }) => assert_eq!(payload.as_deref(), Some(raw)),
                other => panic!("Expected protocol error for {}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn test_control_plane_response() {
        let response: NewConversationResponse = serde_json::from_str(r#"{"conversation_id": "abc", "extra": 1}"#).unwrap();
        assert_eq!(response.conversation_id.as_deref(), Some("abc"));

        let response: NewConversationResponse = serde_json::from_str("{}").unwrap();
        assert!(response.conversation_id.is_none());
    }
}
