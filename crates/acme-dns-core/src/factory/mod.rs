//! Plugin-based zone factory
//!
//! The factory turns a [`ZoneConfig`] into a ready-to-use [`DnsZone`].
//! Provider crates register a [`DnsZoneFactory`] under their provider name,
//! so selecting a provider is a map lookup rather than a hardcoded match.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use acme_dns_core::{ZoneConfig, ZoneFactory};
//!
//! let factory = ZoneFactory::new();
//! acme_dns_cloudflare::register(&factory);
//!
//! let config = ZoneConfig::cloudflare(api_token, zone_id);
//! let zone = factory.create(&config)?;
//! ```
//!
//! ## Guarantees
//!
//! - The configuration is validated before any provider factory runs; the
//!   first missing field is reported by name.
//! - Provider factories return lazily-initialized zones, so `create` never
//!   performs I/O or resolves credentials.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

use crate::config::ZoneConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsZone, DnsZoneFactory};

/// Zone factory for plugin-based DNS provider selection
///
/// ## Thread Safety
///
/// The factory uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ZoneFactory {
    /// Registered provider factories
    providers: RwLock<HashMap<String, Box<dyn DnsZoneFactory>>>,
}

impl ZoneFactory {
    /// Create a new empty factory
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name (e.g., "azure", "cloudflare")
    /// - `factory`: Factory object for creating zone instances
    pub fn register_provider(&self, name: impl Into<String>, factory: Box<dyn DnsZoneFactory>) {
        let name = name.into();
        let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        providers.insert(name, factory);
    }

    /// Create a DNS zone from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsZone>)`: Zone ready for use (initialized on first call)
    /// - `Err(Error::MissingField)` / `Err(Error::Config)`: Invalid configuration
    /// - `Err(Error::Unsupported)`: No factory registered for the provider
    pub fn create(&self, config: &ZoneConfig) -> Result<Box<dyn DnsZone>> {
        config.validate()?;

        let provider_type = config.provider_name();
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);

        let factory = providers.get(provider_type).ok_or_else(|| {
            Error::unsupported(format!(
                "Unable to build DNS client: provider '{}' is not registered",
                provider_type
            ))
        })?;

        debug!(provider = provider_type, "Creating DNS zone");
        factory.create(config)
    }

    /// List all registered provider types
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<_> = providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        providers.contains_key(name)
    }
}

impl std::fmt::Debug for ZoneFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneFactory")
            .field("providers", &self.list_providers())
            .finish()
    }
}
