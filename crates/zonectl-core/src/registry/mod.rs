//! Plugin-based provider registry
//!
//! The registry allows DNS providers to be registered at runtime, so the
//! binary picks a backend from configuration instead of an if-else chain.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zonectl_core::registry::ProviderRegistry;
//! use zonectl_core::config::ProviderConfig;
//!
//! let registry = ProviderRegistry::with_builtin();
//! zonectl_provider_gcloud::register(&registry);
//!
//! let config = ProviderConfig::GoogleCloud { ... };
//! let provider = registry.create_provider(&config)?;
//! ```

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, DnsProviderFactory};

/// Provider registry for plugin-based DNS provider creation
///
/// Maps provider type names (as returned by [`ProviderConfig::type_name`]) to
/// factories.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Box<dyn DnsProviderFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the providers built into this crate
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        crate::memory::register(&registry);
        registry
    }

    /// Register a DNS provider factory under `name`
    ///
    /// A later registration under the same name replaces the earlier one.
    pub fn register_provider(&self, name: impl Into<String>, factory: Box<dyn DnsProviderFactory>) {
        let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        providers.insert(name.into(), factory);
    }

    /// Create a DNS provider from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsProvider>)`: Created provider instance
    /// - `Err(Error)`: If the config is invalid, the type is not registered, or creation fails
    pub fn create_provider(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        config.validate()?;

        let provider_type = config.type_name();
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);

        let factory = providers
            .get(provider_type)
            .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?;

        factory.create(config)
    }

    /// List all registered provider types
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        providers.contains_key(name)
    }
}
