//! Challenge record reconciliation
//!
//! [`RecordSetZone`] implements [`DnsZone`] on top of any [`ZoneStore`].
//! Providers only supply the record set wire calls; the ordering and
//! idempotency rules live here.
//!
//! ## Set Flow
//!
//! 1. Compute every record name (no I/O). Any identifier outside the zone
//!    fails the whole call before anything is touched.
//! 2. For each challenge, read the record set fresh, then:
//!    - absent → create it with the challenge value and a 60 second TTL
//!    - value already present → skip
//!    - otherwise → append the value and write the set back
//!
//! ## Remove Flow
//!
//! For each challenge, read the record set fresh, then delete it if it
//! exists. Failures are collected and reported once every challenge has been
//! attempted. A challenge whose record name cannot be derived is reported
//! the same way and does not stop cleanup of the others.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::challenge::Order;
use crate::error::{Error, RecordOperation, Result};
use crate::naming::txt_record_name;
use crate::traits::{DnsZone, ReconcileReport, RecordChange, TxtRecordSet, ZoneStore};

/// DNS zone reconciling challenge records against a remote zone store
///
/// # Concurrency
///
/// Challenges are processed one after another, so the read and write for a
/// record name never interleave with another challenge of the same batch.
/// The remote zone itself is not locked; every write is preceded by a fresh
/// read and only ever adds values.
#[derive(Debug)]
pub struct RecordSetZone<S> {
    store: S,
}

impl<S: ZoneStore> RecordSetZone<S> {
    /// Create a zone over a store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying zone store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Zone apex name
    pub fn zone_name(&self) -> &str {
        self.store.zone_name()
    }

    /// Compute and assign the record name of every challenge
    ///
    /// All names are computed before any is assigned, so a mapping failure
    /// leaves the order untouched.
    fn compute_record_names(&self, order: &mut Order) -> Result<()> {
        let zone = self.store.zone_name();
        let names = order
            .challenges
            .iter()
            .map(|challenge| txt_record_name(&challenge.identifier, zone))
            .collect::<Result<Vec<_>>>()?;

        for (challenge, name) in order.challenges.iter_mut().zip(names) {
            challenge.set_record_name(name);
        }

        Ok(())
    }

    async fn read(&self, record: &str) -> Result<Option<TxtRecordSet>> {
        self.store
            .get_record_set(record)
            .await
            .map_err(|e| Error::record_operation(RecordOperation::Read, record, e))
    }

    async fn apply_txt_record(&self, record: &str, txt_value: &str) -> Result<RecordChange> {
        match self.read(record).await? {
            None => {
                debug!(record, "No TXT record set found, creating");
                let record_set = TxtRecordSet::challenge(record, txt_value);
                self.store
                    .create_or_update_record_set(&record_set)
                    .await
                    .map_err(|e| Error::record_operation(RecordOperation::Create, record, e))?;
                Ok(RecordChange::Created)
            }
            Some(existing) if existing.contains(txt_value) => {
                debug!(record, "TXT record set already holds challenge value, skipping");
                Ok(RecordChange::Unchanged)
            }
            Some(mut existing) => {
                debug!(
                    record,
                    existing_values = existing.values.len(),
                    "Updating TXT record set"
                );
                existing.values.push(txt_value.to_string());
                self.store
                    .create_or_update_record_set(&existing)
                    .await
                    .map_err(|e| Error::record_operation(RecordOperation::Update, record, e))?;
                Ok(RecordChange::Updated)
            }
        }
    }

    async fn remove_txt_record(&self, record: &str) -> Result<RecordChange> {
        if self.read(record).await?.is_none() {
            debug!(record, "No TXT record set found, skipping delete");
            return Ok(RecordChange::Absent);
        }

        debug!(record, "Removing TXT record set");
        self.store
            .delete_record_set(record)
            .await
            .map_err(|e| Error::record_operation(RecordOperation::Delete, record, e))?;
        Ok(RecordChange::Removed)
    }
}

#[async_trait]
impl<S: ZoneStore> DnsZone for RecordSetZone<S> {
    async fn set_challenge_records(&self, order: &mut Order) -> Result<ReconcileReport> {
        self.compute_record_names(order)?;

        info!(
            provider = self.store.provider_name(),
            zone = self.store.zone_name(),
            challenges = order.len(),
            "Setting challenge records"
        );

        let mut report = ReconcileReport::default();
        for challenge in &order.challenges {
            let record = challenge
                .txt_record()
                .ok_or_else(|| Error::mapping(&challenge.identifier, self.store.zone_name()))?;

            let change = self.apply_txt_record(record, &challenge.txt_value).await?;
            report.push(record, change);
        }

        Ok(report)
    }

    async fn remove_challenge_records(&self, order: &mut Order) -> Result<ReconcileReport> {
        let mut failures = Vec::new();

        // Orders that never went through set_challenge_records still need names
        let zone = self.store.zone_name();
        for challenge in order.challenges.iter_mut() {
            if challenge.txt_record().is_some() {
                continue;
            }
            match txt_record_name(&challenge.identifier, zone) {
                Ok(name) => challenge.set_record_name(name),
                Err(e) => {
                    warn!(identifier = %challenge.identifier, error = %e, "Skipping challenge removal");
                    failures.push(e);
                }
            }
        }

        info!(
            provider = self.store.provider_name(),
            zone = self.store.zone_name(),
            challenges = order.len(),
            "Removing challenge records"
        );

        let mut report = ReconcileReport::default();

        for challenge in &order.challenges {
            let Some(record) = challenge.txt_record() else {
                continue;
            };

            match self.remove_txt_record(record).await {
                Ok(change) => report.push(record, change),
                Err(e) => {
                    warn!(record, error = %e, "Failed to remove TXT record set");
                    failures.push(e);
                }
            }
        }

        if failures.is_empty() {
            Ok(report)
        } else {
            Err(Error::Removal(failures))
        }
    }

    fn provider_name(&self) -> &'static str {
        self.store.provider_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryZoneStore;

    fn zone() -> RecordSetZone<MemoryZoneStore> {
        RecordSetZone::new(MemoryZoneStore::new("example.com"))
    }

    #[tokio::test]
    async fn test_set_creates_record_set_with_short_ttl() {
        let zone = zone();
        let mut order = Order::new().with_challenge("www.example.com", "abc123");

        let report = zone.set_challenge_records(&mut order).await.unwrap();

        assert_eq!(order.challenges[0].txt_record(), Some("_acme-challenge.www"));
        assert_eq!(
            report.change_for("_acme-challenge.www"),
            Some(&RecordChange::Created)
        );

        let set = zone.store().get("_acme-challenge.www").await.unwrap();
        assert_eq!(set.ttl, 60);
        assert_eq!(set.values, vec!["abc123".to_string()]);
    }

    #[tokio::test]
    async fn test_second_set_is_a_no_op() {
        let zone = zone();
        let mut order = Order::new().with_challenge("www.example.com", "abc123");

        zone.set_challenge_records(&mut order).await.unwrap();
        let writes_after_first = zone.store().write_count();
        let report = zone.set_challenge_records(&mut order).await.unwrap();

        assert_eq!(report.mutations(), 0);
        assert_eq!(zone.store().write_count(), writes_after_first);
    }

    #[tokio::test]
    async fn test_two_challenges_on_same_name_share_the_set() {
        // Wildcard and apex validate at the same name
        let zone = zone();
        let mut order = Order::new()
            .with_challenge("example.com", "apex")
            .with_challenge("*.example.com", "wildcard");

        let report = zone.set_challenge_records(&mut order).await.unwrap();

        assert_eq!(
            report.changes,
            vec![
                ("_acme-challenge".to_string(), RecordChange::Created),
                ("_acme-challenge".to_string(), RecordChange::Updated),
            ]
        );
        let set = zone.store().get("_acme-challenge").await.unwrap();
        assert_eq!(set.values, vec!["apex".to_string(), "wildcard".to_string()]);
    }

    #[tokio::test]
    async fn test_mapping_failure_leaves_order_untouched() {
        let zone = zone();
        let mut order = Order::new()
            .with_challenge("www.example.com", "1")
            .with_challenge("www.example.org", "2");

        let err = zone.set_challenge_records(&mut order).await.unwrap_err();

        assert!(matches!(err, Error::Mapping { .. }));
        assert_eq!(order.txt_records().count(), 0);
        assert_eq!(zone.store().read_count(), 0);
    }

    #[tokio::test]
    async fn test_remove_computes_missing_names() {
        let zone = zone();
        zone.store()
            .insert(TxtRecordSet::challenge("_acme-challenge.www", "abc123"))
            .await;

        let mut order = Order::new().with_challenge("www.example.com", "abc123");
        let report = zone.remove_challenge_records(&mut order).await.unwrap();

        assert_eq!(
            report.change_for("_acme-challenge.www"),
            Some(&RecordChange::Removed)
        );
        assert!(zone.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_skips_unmappable_identifier() {
        let zone = zone();
        zone.store()
            .insert(TxtRecordSet::challenge("_acme-challenge.www", "abc123"))
            .await;

        let mut order = Order::new()
            .with_challenge("www.example.org", "stray")
            .with_challenge("www.example.com", "abc123");
        let err = zone.remove_challenge_records(&mut order).await.unwrap_err();

        match err {
            Error::Removal(failures) => {
                assert_eq!(failures.len(), 1);
                assert!(matches!(failures[0], Error::Mapping { .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(zone.store().is_empty().await);
        assert_eq!(order.challenges[1].txt_record(), Some("_acme-challenge.www"));
    }

    #[tokio::test]
    async fn test_provider_name_comes_from_store() {
        assert_eq!(zone().provider_name(), "memory");
    }
}
