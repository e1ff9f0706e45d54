// # Zone Store Trait
//
// Record-level access to one remote authoritative zone.
//
// ## Purpose
//
// A zone store hides the wire protocol of a DNS provider behind three
// record set operations. The reconciliation algorithm in `RecordSetZone`
// is written once against this trait.
//
// ## Contract
//
// - Every call goes to the remote zone. No caching between calls: other
//   actors may change the zone at any time.
// - Names are relative to the zone apex (e.g., `_acme-challenge.www`).
// - No retries. Errors are returned to the caller untouched.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// TTL for challenge record sets (seconds)
pub const CHALLENGE_TTL_SECS: u32 = 60;

/// A TXT record set as stored in the remote zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxtRecordSet {
    /// Name relative to the zone apex
    pub name: String,

    /// Time-to-live in seconds
    pub ttl: u32,

    /// TXT values at this name
    pub values: Vec<String>,
}

impl TxtRecordSet {
    /// Create a challenge record set holding a single value
    pub fn challenge(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ttl: CHALLENGE_TTL_SECS,
            values: vec![value.into()],
        }
    }

    /// Whether the set already holds a value
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

/// Trait for remote zone stores
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait ZoneStore: Send + Sync {
    /// Zone apex name (e.g., "example.com")
    fn zone_name(&self) -> &str;

    /// Read the TXT record set at a name
    ///
    /// # Returns
    ///
    /// - `Ok(Some(set))`: the record set exists
    /// - `Ok(None)`: no TXT record set at this name
    /// - `Err(Error)`: the read failed
    async fn get_record_set(&self, name: &str) -> Result<Option<TxtRecordSet>, crate::Error>;

    /// Write a TXT record set, replacing whatever is stored at its name
    async fn create_or_update_record_set(&self, record_set: &TxtRecordSet) -> Result<(), crate::Error>;

    /// Delete the TXT record set at a name
    async fn delete_record_set(&self, name: &str) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
