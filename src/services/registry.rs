//! Provider registry
//!
//! Maps provider names to adapter factories. The harness owns a registry and
//! asks it for adapters by `{provider}/{model}` path.

use crate::models::harness::GenerateConfig;
use crate::providers::{EndpointAdapter, ModelApi};
use crate::utils::error::{helpers::configuration_error, AdapterResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Builds an adapter from `(model_name, base_url, config)`
pub type ProviderFactory =
    Arc<dyn Fn(&str, Option<&str>, &GenerateConfig) -> AdapterResult<Arc<dyn ModelApi>> + Send + Sync>;

/// Provider registry
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in providers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("endpoint", |model, base_url, config| {
            let adapter = EndpointAdapter::new(model, base_url, config)?;
            Ok(Arc::new(adapter) as Arc<dyn ModelApi>)
        });
        registry
    }

    /// Register a factory, replacing any previous one with the same name
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&str, Option<&str>, &GenerateConfig) -> AdapterResult<Arc<dyn ModelApi>> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!("Registering provider {}", name);
        self.factories.insert(name, Arc::new(factory));
    }

    /// Registered provider names, sorted
    pub fn providers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build an adapter for a `{provider}/{model}` path
    pub fn create(
        &self,
        model_path: &str,
        base_url: Option<&str>,
        config: &GenerateConfig,
    ) -> AdapterResult<Arc<dyn ModelApi>> {
        let (provider, model) = model_path
            .split_once('/')
            .filter(|(provider, model)| !provider.is_empty() && !model.is_empty())
            .ok_or_else(|| configuration_error(format!(
                "Model path must look like provider/model: {}",
                model_path
            )))?;

        let factory = self.factories.get(provider).ok_or_else(|| {
            configuration_error(format!(
                "Unknown provider '{}', registered: {}",
                provider,
                self.providers().join(", ")
            ))
        })?;

        let adapter = factory(model, base_url, config)?;
        info!("Created {} adapter for model {}", provider, model);
        Ok(adapter)
    }
}
