//! Test doubles and common utilities for reconciliation contract tests
//!
//! The doubles wrap the in-memory zone store so that tests can inject
//! remote failures and observe the exact sequence of remote calls.

#![allow(dead_code)]

use acme_dns_core::error::{Error, Result};
use acme_dns_core::{
    DnsZone, DnsZoneFactory, LazyDnsZone, MemoryZoneStore, RecordSetZone, TxtRecordSet,
    ZoneConfig, ZoneInitializer, ZoneStore,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ZONE: &str = "example.com";

/// A zone store that records every call and can be told to fail
#[derive(Clone)]
pub struct ScriptedZoneStore {
    inner: MemoryZoneStore,
    calls: Arc<Mutex<Vec<String>>>,
    failing_reads: Arc<Mutex<HashSet<String>>>,
    failing_writes: Arc<Mutex<HashSet<String>>>,
    failing_deletes: Arc<Mutex<HashSet<String>>>,
}

impl ScriptedZoneStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryZoneStore::new(ZONE),
            calls: Arc::new(Mutex::new(Vec::new())),
            failing_reads: Arc::new(Mutex::new(HashSet::new())),
            failing_writes: Arc::new(Mutex::new(HashSet::new())),
            failing_deletes: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// The backing in-memory zone
    pub fn zone(&self) -> &MemoryZoneStore {
        &self.inner
    }

    /// Remote calls made so far, as "op name" strings
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Remote calls that changed the zone
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("read "))
            .collect()
    }

    pub fn fail_reads_for(&self, name: &str) {
        self.failing_reads.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_writes_for(&self, name: &str) {
        self.failing_writes.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_deletes_for(&self, name: &str) {
        self.failing_deletes.lock().unwrap().insert(name.to_string());
    }

    pub fn heal(&self) {
        self.failing_reads.lock().unwrap().clear();
        self.failing_writes.lock().unwrap().clear();
        self.failing_deletes.lock().unwrap().clear();
    }

    fn log(&self, op: &str, name: &str) {
        self.calls.lock().unwrap().push(format!("{} {}", op, name));
    }
}

#[async_trait]
impl ZoneStore for ScriptedZoneStore {
    fn zone_name(&self) -> &str {
        self.inner.zone_name()
    }

    async fn get_record_set(&self, name: &str) -> Result<Option<TxtRecordSet>> {
        self.log("read", name);
        if self.failing_reads.lock().unwrap().contains(name) {
            return Err(Error::http("503 Service Unavailable"));
        }
        self.inner.get_record_set(name).await
    }

    async fn create_or_update_record_set(&self, record_set: &TxtRecordSet) -> Result<()> {
        self.log("write", &record_set.name);
        if self.failing_writes.lock().unwrap().contains(&record_set.name) {
            return Err(Error::http("503 Service Unavailable"));
        }
        self.inner.create_or_update_record_set(record_set).await
    }

    async fn delete_record_set(&self, name: &str) -> Result<()> {
        self.log("delete", name);
        if self.failing_deletes.lock().unwrap().contains(name) {
            return Err(Error::http("503 Service Unavailable"));
        }
        self.inner.delete_record_set(name).await
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// Initializer that counts how often it runs
pub struct CountingInitializer {
    store: ScriptedZoneStore,
    calls: Arc<AtomicUsize>,
    delay: Duration,
}

impl CountingInitializer {
    pub fn new(store: ScriptedZoneStore) -> (Self, Arc<AtomicUsize>) {
        Self::slow(store, Duration::ZERO)
    }

    /// Initializer that takes `delay` to finish, like a token exchange
    pub fn slow(store: ScriptedZoneStore, delay: Duration) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let initializer = Self {
            store,
            calls: Arc::clone(&calls),
            delay,
        };
        (initializer, calls)
    }
}

#[async_trait]
impl ZoneInitializer for CountingInitializer {
    async fn initialize(&self) -> Result<Box<dyn DnsZone>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Box::new(RecordSetZone::new(self.store.clone())))
    }
}

/// Zone factory handing out lazy zones over a shared scripted store
pub struct ScriptedZoneFactory {
    pub store: ScriptedZoneStore,
    pub initializations: Arc<AtomicUsize>,
}

impl ScriptedZoneFactory {
    pub fn new() -> Self {
        Self {
            store: ScriptedZoneStore::new(),
            initializations: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            store: other.store.clone(),
            initializations: Arc::clone(&other.initializations),
        }
    }

    pub fn initialization_count(&self) -> usize {
        self.initializations.load(Ordering::SeqCst)
    }
}

impl DnsZoneFactory for ScriptedZoneFactory {
    fn create(&self, _config: &ZoneConfig) -> Result<Box<dyn DnsZone>> {
        let initializer = CountingInitializer {
            store: self.store.clone(),
            calls: Arc::clone(&self.initializations),
            delay: Duration::ZERO,
        };
        Ok(Box::new(LazyDnsZone::new("scripted", Box::new(initializer))))
    }
}

/// Reconciling zone over a fresh scripted store
pub fn scripted_zone() -> (RecordSetZone<ScriptedZoneStore>, ScriptedZoneStore) {
    let store = ScriptedZoneStore::new();
    (RecordSetZone::new(store.clone()), store)
}
