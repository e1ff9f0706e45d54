//! Azure DNS zone resource identifiers
//!
//! ```text
//! /subscriptions/{subscription}/resourceGroups/{group}/providers/Microsoft.Network/dnszones/{zone}
//! ```

use acme_dns_core::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Parsed ARM resource id of a DNS zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsZoneResourceId {
    subscription_id: String,
    resource_group: String,
    zone_name: String,
}

impl DnsZoneResourceId {
    /// Subscription the zone lives in
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Resource group the zone lives in
    pub fn resource_group(&self) -> &str {
        &self.resource_group
    }

    /// Zone name (last segment of the id)
    pub fn zone_name(&self) -> &str {
        &self.zone_name
    }

    /// Canonical resource path, starting with `/`
    pub fn path(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/dnszones/{}",
            self.subscription_id, self.resource_group, self.zone_name
        )
    }
}

impl fmt::Display for DnsZoneResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for DnsZoneResourceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::config(format!("Invalid Azure DNS zone resource id: '{}'", s));

        let segments: Vec<&str> = s.trim().split('/').filter(|p| !p.is_empty()).collect();
        let [subs, subscription_id, groups, resource_group, providers, namespace, zones, zone_name] =
            segments.as_slice()
        else {
            return Err(invalid());
        };

        let keys_match = subs.eq_ignore_ascii_case("subscriptions")
            && groups.eq_ignore_ascii_case("resourceGroups")
            && providers.eq_ignore_ascii_case("providers")
            && namespace.eq_ignore_ascii_case("Microsoft.Network")
            && zones.eq_ignore_ascii_case("dnszones");

        if !keys_match {
            return Err(invalid());
        }

        Ok(Self {
            subscription_id: subscription_id.to_string(),
            resource_group: resource_group.to_string(),
            zone_name: zone_name.to_string(),
        })
    }
}
