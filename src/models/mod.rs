//! Data models module
//!
//! Defines the harness-facing types and the streaming endpoint wire format

pub mod harness;
pub mod stream;

pub use harness::*;
pub use stream::{ConversationId, FrameStatus, InboundFrame, OutboundRequest};
