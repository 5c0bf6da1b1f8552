//! Logging utilities
//!
//! Shared helpers for keeping wire payloads readable in logs

use crate::models::stream::OutboundRequest;

/// Set to true to include the full user content in debug logs
pub const VERBOSE_REQUEST_LOGGING: bool = false;

/// Truncate a string with a note about original length
pub fn truncate_content(s: &str, max_chars: usize) -> String {
    let total = s.chars().count();
    if total > max_chars {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}... ({} chars truncated)", head, total - max_chars)
    } else {
        s.to_string()
    }
}

/// Create a filtered summary of an outbound request for logging
///
/// The conversation id is kept whole so log lines can be correlated.
pub fn create_request_log_summary(request: &OutboundRequest) -> serde_json::Value {
    let text = if VERBOSE_REQUEST_LOGGING {
        request.user_content.text.clone()
    } else {
        truncate_content(&request.user_content.text, 200)
    };

    serde_json::json!({
        "conversation_id": request.conversation_id,
        "bot": request.bot.version,
        "command": request.command,
        "user_content": text,
    })
}
