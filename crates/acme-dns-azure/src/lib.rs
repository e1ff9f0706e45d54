// # Azure DNS Zone Provider
//
// This crate provides an Azure DNS zone implementation for ACME DNS-01
// challenge provisioning.
//
// ## Behavior
//
// - The zone is addressed by its ARM resource id; the zone name is the id's
//   last segment unless an override is configured
// - Nothing touches the network until the first zone operation: the
//   credential is asked for a token once, then the HTTP client is built
// - Reconciliation (validate-first, read-before-write, additive merge) is
//   shared with every other provider through `RecordSetZone`
// - NO retry logic (owned by the caller)
// - NO caching of record sets between calls
//
// ## Security Requirements
//
// - Access tokens NEVER appear in logs or `Debug` output
//
// ## API Reference
//
// - Azure DNS REST API: https://learn.microsoft.com/rest/api/dns/
// - Record Sets: `{resourceId}/TXT/{relativeName}?api-version=2018-05-01`

mod resource;
mod store;

pub use resource::DnsZoneResourceId;
pub use store::{AzureDnsStore, DNS_API_VERSION};

use acme_dns_core::{
    DnsZone, DnsZoneFactory, Error, LazyDnsZone, RecordSetZone, Result, SharedCredential,
    ZoneConfig, ZoneFactory, ZoneInitializer,
};
use async_trait::async_trait;
use std::time::Duration;

/// Azure Resource Manager endpoint
pub const AZURE_MANAGEMENT_BASE: &str = "https://management.azure.com";

/// Token scope for Azure Resource Manager
pub const AZURE_MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Deferred construction of an Azure DNS zone
///
/// Holds everything needed to build the zone; `initialize` performs the
/// token exchange and client construction.
#[derive(Debug)]
pub struct AzureZoneInitializer {
    credential: SharedCredential,
    resource_id: DnsZoneResourceId,
    zone_name: String,
    base_url: String,
}

impl AzureZoneInitializer {
    /// Create an initializer
    ///
    /// # Parameters
    ///
    /// - `credential`: Pre-resolved credential
    /// - `resource_id`: Zone resource id
    /// - `zone_name_override`: Zone name to use instead of the id's last segment
    /// - `base_url`: Resource Manager endpoint
    pub fn new(
        credential: SharedCredential,
        resource_id: DnsZoneResourceId,
        zone_name_override: Option<&str>,
        base_url: impl Into<String>,
    ) -> Self {
        let zone_name = zone_name_override
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| resource_id.zone_name())
            .to_string();

        Self {
            credential,
            resource_id,
            zone_name,
            base_url: base_url.into(),
        }
    }

    /// Zone name records are derived against
    pub fn zone_name(&self) -> &str {
        &self.zone_name
    }
}

#[async_trait]
impl ZoneInitializer for AzureZoneInitializer {
    async fn initialize(&self) -> Result<Box<dyn DnsZone>> {
        tracing::debug!("Getting DNS client token for {}", self.resource_id);

        let token = self.credential.get_token(AZURE_MANAGEMENT_SCOPE).await?;

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!("Azure DNS client ready for zone {}", self.zone_name);

        let store = AzureDnsStore::new(
            client,
            self.base_url.clone(),
            self.resource_id.clone(),
            self.zone_name.clone(),
            token,
        );
        Ok(Box::new(RecordSetZone::new(store)))
    }
}

/// Factory for creating Azure DNS zones
#[derive(Debug, Clone)]
pub struct AzureZoneFactory {
    base_url: String,
}

impl AzureZoneFactory {
    /// Factory targeting the public Resource Manager endpoint
    pub fn new() -> Self {
        Self::with_base_url(AZURE_MANAGEMENT_BASE)
    }

    /// Factory targeting another Resource Manager endpoint (sovereign clouds, tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for AzureZoneFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl DnsZoneFactory for AzureZoneFactory {
    fn create(&self, config: &ZoneConfig) -> Result<Box<dyn DnsZone>> {
        match config {
            ZoneConfig::Azure {
                credential,
                zone_resource_id,
                zone_name_override,
            } => {
                let credential = credential
                    .clone()
                    .ok_or_else(|| Error::missing_field("azure", "credential"))?;
                if zone_resource_id.trim().is_empty() {
                    return Err(Error::missing_field("azure", "zone_resource_id"));
                }

                // Parsing is local; a malformed id is a configuration error now,
                // not a failure on first use
                let resource_id: DnsZoneResourceId = zone_resource_id.parse()?;

                let initializer = AzureZoneInitializer::new(
                    credential,
                    resource_id,
                    zone_name_override.as_deref(),
                    self.base_url.clone(),
                );

                Ok(Box::new(LazyDnsZone::new("azure", Box::new(initializer))))
            }
            _ => Err(Error::config("Invalid config for Azure provider")),
        }
    }
}

/// Register the Azure provider with a zone factory
///
/// # Example
///
/// ```rust
/// use acme_dns_core::ZoneFactory;
///
/// let factory = ZoneFactory::new();
/// acme_dns_azure::register(&factory);
/// assert!(factory.has_provider("azure"));
/// ```
pub fn register(factory: &ZoneFactory) {
    factory.register_provider("azure", Box::new(AzureZoneFactory::new()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use acme_dns_core::StaticTokenCredential;
    use std::sync::Arc;

    const ID: &str =
        "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Network/dnszones/example.com";

    fn credential() -> SharedCredential {
        Arc::new(StaticTokenCredential::new("test-token"))
    }

    #[test]
    fn test_factory_creation() {
        let factory = AzureZoneFactory::new();
        let zone = factory
            .create(&ZoneConfig::azure(credential(), ID, None))
            .unwrap();
        assert_eq!(zone.provider_name(), "azure");
    }

    #[test]
    fn test_factory_rejects_malformed_resource_id() {
        let factory = AzureZoneFactory::new();
        let err = factory
            .create(&ZoneConfig::azure(credential(), "example.com", None))
            .err().expect("expected error");
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_factory_rejects_other_provider_config() {
        let factory = AzureZoneFactory::new();
        assert!(factory.create(&ZoneConfig::cloudflare("t", "z")).is_err());
    }

    #[test]
    fn test_zone_name_override() {
        let id: DnsZoneResourceId = ID.parse().unwrap();

        let plain = AzureZoneInitializer::new(credential(), id.clone(), None, AZURE_MANAGEMENT_BASE);
        assert_eq!(plain.zone_name(), "example.com");

        let overridden = AzureZoneInitializer::new(
            credential(),
            id.clone(),
            Some("internal.example.com"),
            AZURE_MANAGEMENT_BASE,
        );
        assert_eq!(overridden.zone_name(), "internal.example.com");

        let blank = AzureZoneInitializer::new(credential(), id, Some(""), AZURE_MANAGEMENT_BASE);
        assert_eq!(blank.zone_name(), "example.com");
    }

    #[test]
    fn test_register() {
        let factory = ZoneFactory::new();
        register(&factory);
        assert!(factory.has_provider("azure"));
    }
}
