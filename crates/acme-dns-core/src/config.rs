//! Configuration types for challenge provisioning
//!
//! This module defines the zone configuration handed over by the external
//! configuration layer. It is validated once by the
//! [`ZoneFactory`](crate::ZoneFactory) and not re-validated downstream.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::traits::TokenCredential;

/// Shared handle to a pre-resolved credential
pub type SharedCredential = Arc<dyn TokenCredential>;

/// Built-in DNS provider discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Azure DNS zone addressed by resource id
    Azure,
    /// Cloudflare zone addressed by zone identifier
    Cloudflare,
}

impl ProviderKind {
    /// Get the provider type name
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Azure => "azure",
            ProviderKind::Cloudflare => "cloudflare",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "azure" => Ok(ProviderKind::Azure),
            "cloudflare" => Ok(ProviderKind::Cloudflare),
            other => Err(crate::Error::unsupported(format!(
                "DNS provider '{}' is not supported. Supported providers: azure, cloudflare",
                other
            ))),
        }
    }
}

/// DNS zone configuration
///
/// One variant per provider. Required fields are plain values so that a
/// missing field is detected by [`validate`](Self::validate) and reported by
/// name, before anything is constructed.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum ZoneConfig {
    /// Azure DNS zone
    Azure {
        /// Pre-resolved credential (never serialized)
        #[serde(skip)]
        credential: Option<SharedCredential>,
        /// ARM resource id of the DNS zone
        zone_resource_id: String,
        /// Zone name to use instead of the resource id's last segment
        #[serde(default)]
        zone_name_override: Option<String>,
    },

    /// Cloudflare zone
    Cloudflare {
        /// Cloudflare API token
        /// ⚠️ NEVER log this value
        api_token: String,
        /// Zone identifier
        zone_identifier: String,
    },

    /// Externally registered provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ZoneConfig {
    /// Create an Azure zone configuration
    pub fn azure(
        credential: SharedCredential,
        zone_resource_id: impl Into<String>,
        zone_name_override: Option<String>,
    ) -> Self {
        ZoneConfig::Azure {
            credential: Some(credential),
            zone_resource_id: zone_resource_id.into(),
            zone_name_override,
        }
    }

    /// Create a Cloudflare zone configuration
    pub fn cloudflare(api_token: impl Into<String>, zone_identifier: impl Into<String>) -> Self {
        ZoneConfig::Cloudflare {
            api_token: api_token.into(),
            zone_identifier: zone_identifier.into(),
        }
    }

    /// Validate the zone configuration
    ///
    /// Fields are checked in declaration order; the first missing one is
    /// reported.
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ZoneConfig::Azure {
                credential,
                zone_resource_id,
                ..
            } => {
                if credential.is_none() {
                    return Err(crate::Error::missing_field("azure", "credential"));
                }
                if zone_resource_id.trim().is_empty() {
                    return Err(crate::Error::missing_field("azure", "zone_resource_id"));
                }
                Ok(())
            }
            ZoneConfig::Cloudflare {
                api_token,
                zone_identifier,
            } => {
                if api_token.trim().is_empty() {
                    return Err(crate::Error::missing_field("cloudflare", "api_token"));
                }
                if zone_identifier.trim().is_empty() {
                    return Err(crate::Error::missing_field("cloudflare", "zone_identifier"));
                }
                Ok(())
            }
            ZoneConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom provider factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom provider config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn provider_name(&self) -> &str {
        match self {
            ZoneConfig::Azure { .. } => ProviderKind::Azure.as_str(),
            ZoneConfig::Cloudflare { .. } => ProviderKind::Cloudflare.as_str(),
            ZoneConfig::Custom { factory, .. } => factory,
        }
    }
}

// Custom Debug implementation that hides the API token
impl fmt::Debug for ZoneConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneConfig::Azure {
                credential,
                zone_resource_id,
                zone_name_override,
            } => f
                .debug_struct("Azure")
                .field("credential", credential)
                .field("zone_resource_id", zone_resource_id)
                .field("zone_name_override", zone_name_override)
                .finish(),
            ZoneConfig::Cloudflare {
                zone_identifier, ..
            } => f
                .debug_struct("Cloudflare")
                .field("api_token", &"<REDACTED>")
                .field("zone_identifier", zone_identifier)
                .finish(),
            ZoneConfig::Custom { factory, config } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .field("config", config)
                .finish(),
        }
    }
}
