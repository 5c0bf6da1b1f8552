//! Streaming endpoint provider
//!
//! Each generation opens a conversation on the control plane, streams the
//! answer over a WebSocket and closes the socket before returning.

use super::ModelApi;
use crate::config::{Credentials, TimeoutConfig};
use crate::models::harness::*;
use crate::models::stream::OutboundRequest;
use crate::services::aggregator::FrameAggregator;
use crate::services::channel::{ChannelConnector, ScopedChannel, WsConnector};
use crate::services::session::{HttpSessionInitiator, SessionInitiator};
use crate::utils::error::{helpers::configuration_error, AdapterResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Models served by the streaming endpoint
pub const ENDPOINT_MODELS: &[&str] = &["eai-stream"];

/// Streaming endpoint adapter
pub struct EndpointAdapter {
    model_name: String,
    credentials: Arc<Credentials>,
    session: Arc<dyn SessionInitiator>,
    connector: Arc<dyn ChannelConnector>,
    stream_idle_timeout: Duration,
}

impl std::fmt::Debug for EndpointAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointAdapter")
            .field("model_name", &self.model_name)
            .field("credentials", &self.credentials)
            .field("stream_idle_timeout", &self.stream_idle_timeout)
            .finish()
    }
}

impl EndpointAdapter {
    /// Create an adapter from environment configuration
    ///
    /// `base_url` overrides the control-plane base address.
    pub fn new(model_name: &str, base_url: Option<&str>, _config: &GenerateConfig) -> AdapterResult<Self> {
        validate_model_name(model_name)?;

        let timeouts = TimeoutConfig::from_env()
            .map_err(|e| configuration_error(format!("{:#}", e)))?;
        let credentials = Credentials::from_env(base_url)?;

        let session = HttpSessionInitiator::with_timeout(timeouts.control_plane())?;
        let connector = WsConnector::new(timeouts.connect());

        Self::with_components(
            model_name,
            credentials,
            Arc::new(session),
            Arc::new(connector),
            &timeouts,
        )
    }

    /// Create an adapter from explicit parts
    pub fn with_components(
        model_name: &str,
        credentials: Credentials,
        session: Arc<dyn SessionInitiator>,
        connector: Arc<dyn ChannelConnector>,
        timeouts: &TimeoutConfig,
    ) -> AdapterResult<Self> {
        validate_model_name(model_name)?;

        debug!("Endpoint adapter ready for model {}", model_name);

        Ok(Self {
            model_name: model_name.to_string(),
            credentials: Arc::new(credentials),
            session,
            connector,
            stream_idle_timeout: timeouts.stream_idle(),
        })
    }

    /// Run one exchange: conversation, channel, aggregation, close
    async fn exchange(&self, user_content: String, deadline: Option<Instant>) -> AdapterResult<String> {
        let conversation_id = self.session.new_conversation(&self.credentials).await?;
        let request = OutboundRequest::streaming(
            conversation_id,
            &self.credentials.model_selector,
            user_content,
        );

        let mut channel = ScopedChannel::new(self.connector.open(&self.credentials).await?);
        let result = self.stream(&mut channel, &request, deadline).await;
        channel.close().await;

        result
    }

    async fn stream(
        &self,
        channel: &mut ScopedChannel,
        request: &OutboundRequest,
        deadline: Option<Instant>,
    ) -> AdapterResult<String> {
        let channel = channel.channel()?;
        channel.send(request).await?;

        FrameAggregator::new()
            .drive(channel, self.stream_idle_timeout, deadline)
            .await
    }
}

fn validate_model_name(model_name: &str) -> AdapterResult<()> {
    if ENDPOINT_MODELS.contains(&model_name) {
        Ok(())
    } else {
        Err(configuration_error(format!("Invalid endpoint model name: {}", model_name)))
    }
}

#[async_trait]
impl ModelApi for EndpointAdapter {
    fn name(&self) -> &str {
        "endpoint"
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate(
        &self,
        input: &[ChatMessage],
        _tools: &[ToolInfo],
        _tool_choice: &ToolChoice,
        config: &GenerateConfig,
    ) -> AdapterResult<ModelOutput> {
        // Only the latest message is sent; earlier turns are not replayed
        let user_content = input
            .last()
            .map(ChatMessage::text)
            .ok_or_else(|| configuration_error("generate requires at least one message"))?;

        let exchange_id = Uuid::new_v4();
        let span = info_span!("exchange", id = %exchange_id, model = %self.model_name);
        let deadline = config.timeout.map(|secs| Instant::now() + Duration::from_secs(secs));

        let started = std::time::Instant::now();
        let result = self.exchange(user_content, deadline).instrument(span.clone()).await;
        let elapsed = started.elapsed();

        match result {
            Ok(answer) => {
                info!(parent: &span, elapsed_ms = elapsed.as_millis() as u64, chars = answer.len(), "Exchange completed");
                Ok(ModelOutput {
                    model: self.model_name.clone(),
                    choices: vec![ChatCompletionChoice {
                        message: ChatMessageAssistant::generated(answer),
                        stop_reason: StopReason::Unknown,
                    }],
                    usage: None,
                    time: Some(elapsed.as_secs_f64()),
                })
            }
            Err(e) => {
                if e.should_log_details() {
                    warn!(
                        parent: &span,
                        elapsed_ms = elapsed.as_millis() as u64,
                        error_type = e.error_type(),
                        payload = e.payload().unwrap_or_default(),
                        "Exchange failed: {}",
                        e
                    );
                } else {
                    warn!(parent: &span, error_type = e.error_type(), "Exchange failed");
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::AdapterError;

    #[test]
    fn test_model_allow_list() {
        assert!(validate_model_name("eai-stream").is_ok());
        assert!(matches!(validate_model_name("gpt-4"), Err(AdapterError::Configuration(_))));
        assert!(matches!(validate_model_name(""), Err(AdapterError::Configuration(_))));
    }

    #[test]
    fn test_unknown_model_fails_before_reading_environment() {
        // No credentials are set here; the model check must fail first
        let error = EndpointAdapter::new("jamba-instruct", None, &GenerateConfig::default()).unwrap_err();
        assert!(error.to_string().contains("Invalid endpoint model name"));
    }
}
