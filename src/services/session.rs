//! Session initiator
//!
//! Allocates one conversation on the control plane per exchange

use crate::config::Credentials;
use crate::models::stream::{ConversationId, NewConversationResponse};
use crate::utils::error::{helpers::control_plane_error, AdapterResult, ErrorContext};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

/// Obtains a fresh conversation identifier
#[async_trait]
pub trait SessionInitiator: Send + Sync {
    async fn new_conversation(&self, credentials: &Credentials) -> AdapterResult<ConversationId>;
}

/// Control-plane client over HTTP
#[derive(Debug, Clone)]
pub struct HttpSessionInitiator {
    client: Client,
    timeout: Duration,
}

impl HttpSessionInitiator {
    /// Create a session initiator with the default timeout
    pub fn new() -> AdapterResult<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a session initiator with a custom timeout
    pub fn with_timeout(timeout: Duration) -> AdapterResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("evalshim/", env!("CARGO_PKG_VERSION")))
            .build()
            .configuration_context("Failed to create HTTP client")?;

        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl SessionInitiator for HttpSessionInitiator {
    async fn new_conversation(&self, credentials: &Credentials) -> AdapterResult<ConversationId> {
        let url = credentials.conversation_url();
        debug!("Requesting new conversation from {}", url);

        let response = self.client
            .post(&url)
            .header("Authorization", &credentials.token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    control_plane_error(format!("request timed out after {:?}", self.timeout))
                } else {
                    control_plane_error(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Control plane request failed: {} - {}", status, error_text);
            return Err(control_plane_error(format!(
                "control plane returned {}: {}",
                status, error_text
            )));
        }

        let body: NewConversationResponse = response
            .json()
            .await
            .control_plane_context("Failed to parse control plane response")?;

        match body.conversation_id {
            Some(id) if !id.is_empty() => {
                debug!("Conversation {} created", id);
                Ok(ConversationId::new(id))
            }
            _ => Err(control_plane_error("response is missing `conversation_id`")),
        }
    }
}
