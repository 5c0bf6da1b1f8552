//! Evaluation harness adapter library
//!
//! Lets an evaluation harness call chat-completion backends through the
//! [`ModelApi`] trait, including a streaming backend that aggregates answers
//! received over a WebSocket

pub mod config;
pub mod models;
pub mod providers;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::{Credentials, Settings};
pub use models::harness::{ChatMessage, GenerateConfig, ModelOutput, ToolChoice, ToolInfo};
pub use providers::{EndpointAdapter, ModelApi};
pub use services::ProviderRegistry;
pub use utils::error::{AdapterError, AdapterResult};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
