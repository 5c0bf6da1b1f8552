//! Configuration management module
//!
//! Responsible for loading runtime settings and backend credentials from the environment

pub mod credentials;
pub mod settings;

pub use credentials::Credentials;
pub use settings::{LoggingConfig, Settings, TimeoutConfig};
