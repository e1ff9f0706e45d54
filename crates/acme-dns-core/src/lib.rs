// # acme-dns-core
//
// Core library for provisioning ACME DNS-01 challenge records.
//
// ## Architecture Overview
//
// This library provides the provider-agnostic part of DNS-01 provisioning:
// - **DnsZone**: Trait the ACME driver calls to set and remove challenge records
// - **ZoneStore**: Trait for record set access to one remote zone
// - **RecordSetZone**: Reconciliation of an Order against any ZoneStore
// - **LazyDnsZone**: Defers credential exchange and client construction to first use
// - **ZoneFactory**: Plugin-based registry turning a ZoneConfig into a DnsZone
//
// ## Design Principles
//
// 1. **Validate before mutating**: every record name is computed before any remote call
// 2. **Idempotency**: re-running a batch after a partial failure is always safe
// 3. **Merge, never replace**: existing TXT values at a name are preserved
// 4. **No internal retries**: retry policy belongs to the caller
// 5. **Lazy credentials**: nothing touches the network until a zone operation runs

pub mod challenge;
pub mod config;
pub mod error;
pub mod factory;
pub mod lazy;
pub mod naming;
pub mod reconcile;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use challenge::{DnsChallenge, Order};
pub use config::{ProviderKind, SharedCredential, ZoneConfig};
pub use error::{Error, RecordOperation, Result};
pub use factory::ZoneFactory;
pub use lazy::LazyDnsZone;
pub use reconcile::RecordSetZone;
pub use store::MemoryZoneStore;
pub use traits::{
    AccessToken, CHALLENGE_TTL_SECS, DnsZone, DnsZoneFactory, ReconcileReport, RecordChange,
    StaticTokenCredential, TokenCredential, TxtRecordSet, ZoneInitializer, ZoneStore,
};
