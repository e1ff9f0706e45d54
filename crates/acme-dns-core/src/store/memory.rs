// # Memory Zone Store
//
// In-memory implementation of ZoneStore.
//
// ## Purpose
//
// Holds TXT record sets in a HashMap behind an async RwLock. Useful for
// testing reconciliation, dry runs, and embedding without a real provider.
//
// ## Observability
//
// Every trait call is counted, so callers can assert how many reads,
// writes and deletes a reconciliation performed.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::Error;
use crate::naming::fqdn;
use crate::traits::{TxtRecordSet, ZoneStore};

#[derive(Debug, Default)]
struct Counters {
    reads: AtomicUsize,
    writes: AtomicUsize,
    deletes: AtomicUsize,
}

/// In-memory zone store
///
/// Clones share the same record sets and counters.
///
/// # Example
///
/// ```rust,no_run
/// use acme_dns_core::{DnsZone, Order, RecordSetZone};
/// use acme_dns_core::store::MemoryZoneStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryZoneStore::new("example.com");
///     let zone = RecordSetZone::new(store.clone());
///
///     let mut order = Order::new().with_challenge("www.example.com", "abc123");
///     zone.set_challenge_records(&mut order).await?;
///
///     assert!(store.get("_acme-challenge.www").await.is_some());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryZoneStore {
    zone_name: String,
    inner: Arc<RwLock<HashMap<String, TxtRecordSet>>>,
    counters: Arc<Counters>,
}

impl MemoryZoneStore {
    /// Create a new empty zone
    pub fn new(zone_name: impl Into<String>) -> Self {
        Self {
            zone_name: zone_name.into(),
            inner: Arc::new(RwLock::new(HashMap::new())),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Seed a record set without counting it as a write
    pub async fn insert(&self, record_set: TxtRecordSet) {
        let mut guard = self.inner.write().await;
        guard.insert(record_set.name.clone(), record_set);
    }

    /// Remove a record set without counting it as a delete
    pub async fn remove(&self, name: &str) -> Option<TxtRecordSet> {
        self.inner.write().await.remove(name)
    }

    /// Look up a record set without counting it as a read
    pub async fn get(&self, name: &str) -> Option<TxtRecordSet> {
        self.inner.read().await.get(name).cloned()
    }

    /// Fully qualified names of all record sets, sorted
    pub async fn fqdns(&self) -> Vec<String> {
        let guard = self.inner.read().await;
        let mut names: Vec<_> = guard.keys().map(|n| fqdn(n, &self.zone_name)).collect();
        names.sort();
        names
    }

    /// Get the number of record sets in the zone
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the zone is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Number of `get_record_set` calls
    pub fn read_count(&self) -> usize {
        self.counters.reads.load(Ordering::SeqCst)
    }

    /// Number of `create_or_update_record_set` calls
    pub fn write_count(&self) -> usize {
        self.counters.writes.load(Ordering::SeqCst)
    }

    /// Number of `delete_record_set` calls
    pub fn delete_count(&self) -> usize {
        self.counters.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ZoneStore for MemoryZoneStore {
    fn zone_name(&self) -> &str {
        &self.zone_name
    }

    async fn get_record_set(&self, name: &str) -> Result<Option<TxtRecordSet>, Error> {
        self.counters.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.inner.read().await.get(name).cloned())
    }

    async fn create_or_update_record_set(&self, record_set: &TxtRecordSet) -> Result<(), Error> {
        self.counters.writes.fetch_add(1, Ordering::SeqCst);
        let mut guard = self.inner.write().await;
        guard.insert(record_set.name.clone(), record_set.clone());
        Ok(())
    }

    async fn delete_record_set(&self, name: &str) -> Result<(), Error> {
        self.counters.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.write().await.remove(name);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
