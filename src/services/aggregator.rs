//! Frame aggregator
//!
//! Concatenates `more` fragments in arrival order until `done` arrives

use crate::models::stream::{FrameStatus, InboundFrame};
use crate::services::channel::StreamChannel;
use crate::utils::error::{
    helpers::{protocol_error, transport_error},
    AdapterResult,
};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// What the read loop should do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Done,
}

/// Append-only accumulator for one exchange
#[derive(Debug, Default)]
pub struct FrameAggregator {
    answer: String,
    fragments: usize,
}

impl FrameAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one frame
    pub fn append(&mut self, frame: InboundFrame) -> AdapterResult<Flow> {
        match frame.status {
            FrameStatus::More => {
                if let Some(content) = frame.content {
                    self.answer.push_str(&content);
                }
                self.fragments += 1;
                Ok(Flow::Continue)
            }
            FrameStatus::Done => Ok(Flow::Done),
            FrameStatus::Error => {
                warn!("Endpoint reported an error after {} fragments", self.fragments);
                Err(protocol_error("endpoint reported an error", frame.raw))
            }
            FrameStatus::Other(status) => Err(protocol_error(
                format!("unrecognized frame status `{}`", status),
                frame.raw,
            )),
        }
    }

    /// Number of fragments appended so far
    pub fn fragments(&self) -> usize {
        self.fragments
    }

    /// Text accumulated so far
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Hand over the final answer
    pub fn into_answer(self) -> String {
        self.answer
    }

    /// Read frames from `channel` until the terminal marker
    ///
    /// Each `receive` may wait at most `idle_timeout`, and never past
    /// `deadline` when one is given. The partial answer is dropped on any
    /// error.
    pub async fn drive<C>(
        mut self,
        channel: &mut C,
        idle_timeout: Duration,
        deadline: Option<Instant>,
    ) -> AdapterResult<String>
    where
        C: StreamChannel + ?Sized,
    {
        loop {
            let now = Instant::now();
            let (wait, reason) = match deadline {
                Some(deadline) if deadline.saturating_duration_since(now) < idle_timeout => {
                    (deadline.saturating_duration_since(now), "exchange deadline elapsed")
                }
                _ => (idle_timeout, "no frame received within the idle timeout"),
            };

            let frame = match tokio::time::timeout(wait, channel.receive()).await {
                Ok(frame) => frame?,
                Err(_) => {
                    return Err(transport_error(format!(
                        "{} ({:?}) after {} fragments",
                        reason, wait, self.fragments
                    )))
                }
            };

            if self.append(frame)? == Flow::Done {
                debug!("Terminal frame received after {} fragments", self.fragments);
                return Ok(self.into_answer());
            }
        }
    }
}
