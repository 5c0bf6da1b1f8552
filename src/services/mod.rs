//! Service layer module
//!
//! Contains the session initiator, streaming channel, frame aggregator and provider registry

pub mod aggregator;
pub mod channel;
pub mod registry;
pub mod session;

pub use aggregator::{Flow, FrameAggregator};
pub use channel::{ChannelConnector, ScopedChannel, StreamChannel, WsChannel, WsConnector};
pub use registry::{ProviderFactory, ProviderRegistry};
pub use session::{HttpSessionInitiator, SessionInitiator};
