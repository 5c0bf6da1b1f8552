//! Streaming endpoint credentials
//!
//! All four values are required. Missing ones are reported together.

use crate::utils::error::{AdapterError, AdapterResult, ErrorContext};
use reqwest::Url;
use std::fmt;

/// Auth token
pub const TOKEN_VAR: &str = "ENDPOINT_API_TOKEN";
/// Control-plane base address
pub const CONTROL_URL_VAR: &str = "ENDPOINT_CONTROL_URL";
/// Streaming base address
pub const STREAM_URL_VAR: &str = "ENDPOINT_STREAM_URL";
/// Model/version selector
pub const BOT_VERSION_VAR: &str = "ENDPOINT_BOT_VERSION";

/// Immutable credentials for the streaming backend
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub token: String,
    pub control_plane_base: String,
    pub stream_base: String,
    pub model_selector: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"[redacted]")
            .field("control_plane_base", &self.control_plane_base)
            .field("stream_base", &self.stream_base)
            .field("model_selector", &self.model_selector)
            .finish()
    }
}

impl Credentials {
    /// Build credentials from explicit values
    pub fn new(
        token: impl Into<String>,
        control_plane_base: impl Into<String>,
        stream_base: impl Into<String>,
        model_selector: impl Into<String>,
    ) -> AdapterResult<Self> {
        let credentials = Self {
            token: token.into(),
            control_plane_base: control_plane_base.into(),
            stream_base: stream_base.into(),
            model_selector: model_selector.into(),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Load credentials from the environment
    ///
    /// `base_url` takes precedence over `ENDPOINT_CONTROL_URL`.
    pub fn from_env(base_url: Option<&str>) -> AdapterResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(base_url, |key| std::env::var(key).ok())
    }

    /// Load credentials from an arbitrary variable source
    pub fn from_lookup<F>(base_url: Option<&str>, lookup: F) -> AdapterResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut require = |key: &'static str, explicit: Option<&str>| {
            let value = explicit
                .map(str::to_string)
                .or_else(|| lookup(key))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
            if value.is_none() {
                missing.push(key);
            }
            value.unwrap_or_default()
        };

        let token = require(TOKEN_VAR, None);
        let control_plane_base = require(CONTROL_URL_VAR, base_url);
        let stream_base = require(STREAM_URL_VAR, None);
        let model_selector = require(BOT_VERSION_VAR, None);

        if !missing.is_empty() {
            return Err(AdapterError::Configuration(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        Self::new(token, control_plane_base, stream_base, model_selector)
    }

    /// Validate credential values
    fn validate(&self) -> AdapterResult<()> {
        let fields = [
            ("token", &self.token),
            ("control plane base", &self.control_plane_base),
            ("stream base", &self.stream_base),
            ("model selector", &self.model_selector),
        ];
        let empty: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !empty.is_empty() {
            return Err(AdapterError::Configuration(format!(
                "empty credential fields: {}",
                empty.join(", ")
            )));
        }

        if !self.control_plane_base.starts_with("http") {
            return Err(AdapterError::Configuration(format!(
                "Invalid control plane base URL format, should start with 'http': {}",
                self.control_plane_base
            )));
        }

        if !self.stream_base.starts_with("ws") {
            return Err(AdapterError::Configuration(format!(
                "Invalid stream base URL format, should start with 'ws': {}",
                self.stream_base
            )));
        }

        self.stream_url().map(|_| ())
    }

    /// `POST` target that allocates conversations
    pub fn conversation_url(&self) -> String {
        format!("{}/conversations/new", self.control_plane_base.trim_end_matches('/'))
    }

    /// Streaming endpoint address with the token as a query parameter
    pub fn stream_url(&self) -> AdapterResult<Url> {
        let base = format!("{}/ws", self.stream_base.trim_end_matches('/'));
        let mut url = Url::parse(&base).configuration_context("Invalid stream base URL")?;
        url.query_pairs_mut().append_pair("token", &self.token);
        Ok(url)
    }
}
