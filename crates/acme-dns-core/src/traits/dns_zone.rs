// # DNS Zone Trait
//
// Defines the capability the ACME driver calls to apply and remove a batch of
// DNS-01 challenge records.
//
// ## Implementations
//
// - `RecordSetZone`: reconciliation over any `ZoneStore` (this crate)
// - `LazyDnsZone`: deferred construction wrapper (this crate)
// - Azure DNS: `acme-dns-azure` crate
// - Cloudflare: `acme-dns-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use acme_dns_core::{DnsZone, Order};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let zone = /* DnsZone implementation */;
//
//     let mut order = Order::new().with_challenge("www.example.com", "abc123");
//     zone.set_challenge_records(&mut order).await?;
//
//     // ... ACME validation happens here ...
//
//     zone.remove_challenge_records(&mut order).await?;
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::challenge::Order;
use crate::config::ZoneConfig;

/// Change applied to one record set during reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordChange {
    /// Record set did not exist and was created
    Created,
    /// Record set existed and the challenge value was appended
    Updated,
    /// Record set already contained the challenge value (no-op)
    Unchanged,
    /// Record set was deleted
    Removed,
    /// Record set was already gone (no-op)
    Absent,
}

/// Outcome of one reconciliation call, in challenge order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// `(record name, change)` per challenge
    pub changes: Vec<(String, RecordChange)>,
}

impl ReconcileReport {
    /// Record the change applied to a record set
    pub fn push(&mut self, record: impl Into<String>, change: RecordChange) {
        self.changes.push((record.into(), change));
    }

    /// Number of record sets that were created, updated or removed
    pub fn mutations(&self) -> usize {
        self.changes
            .iter()
            .filter(|(_, change)| {
                matches!(
                    change,
                    RecordChange::Created | RecordChange::Updated | RecordChange::Removed
                )
            })
            .count()
    }

    /// Change recorded for a record set
    pub fn change_for(&self, record: &str) -> Option<&RecordChange> {
        self.changes
            .iter()
            .find(|(name, _)| name == record)
            .map(|(_, change)| change)
    }
}

/// Trait for DNS zone implementations
///
/// A zone applies and removes challenge records for one authoritative zone.
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Retries
///
/// Implementations never retry internally. Both operations are idempotent,
/// so the caller may safely re-run a whole batch after a partial failure.
#[async_trait]
pub trait DnsZone: Send + Sync {
    /// Create or extend the TXT record set of every challenge in the order
    ///
    /// All record names are computed before any remote call; if any
    /// identifier falls outside the zone the call fails without mutating
    /// anything. On return each challenge carries its record name.
    async fn set_challenge_records(
        &self,
        order: &mut Order,
    ) -> Result<ReconcileReport, crate::Error>;

    /// Delete the TXT record set of every challenge in the order
    ///
    /// Already-absent record sets are a no-op. A failure on one challenge
    /// does not stop the others; all failures are reported together.
    async fn remove_challenge_records(
        &self,
        order: &mut Order,
    ) -> Result<ReconcileReport, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// One-shot construction of a ready zone
///
/// Runs the expensive, fallible part of zone setup: credential exchange,
/// HTTP client construction, zone metadata lookup. Called at most once per
/// [`LazyDnsZone`](crate::LazyDnsZone).
#[async_trait]
pub trait ZoneInitializer: Send + Sync {
    /// Build the zone
    async fn initialize(&self) -> Result<Box<dyn DnsZone>, crate::Error>;
}

/// Helper trait for constructing DNS zones from configuration
pub trait DnsZoneFactory: Send + Sync {
    /// Create a DnsZone instance from configuration
    ///
    /// Must not perform I/O. The configuration has already been validated by
    /// the [`ZoneFactory`](crate::ZoneFactory).
    fn create(&self, config: &ZoneConfig) -> Result<Box<dyn DnsZone>, crate::Error>;
}
