//! Provider module
//!
//! Defines the ModelApi trait consumed by the harness and its implementations

pub mod endpoint;

use crate::models::harness::{ChatMessage, GenerateConfig, ModelOutput, ToolChoice, ToolInfo};
use crate::utils::error::AdapterResult;
use async_trait::async_trait;

/// Uniform entry point for every chat-completion backend
///
/// Implementations are validated at construction and must tolerate
/// overlapping `generate` calls on one instance.
#[async_trait]
pub trait ModelApi: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Get the model served by this instance
    fn model_name(&self) -> &str;

    /// Run one generation
    async fn generate(
        &self,
        input: &[ChatMessage],
        tools: &[ToolInfo],
        tool_choice: &ToolChoice,
        config: &GenerateConfig,
    ) -> AdapterResult<ModelOutput>;
}

pub use endpoint::{EndpointAdapter, ENDPOINT_MODELS};
