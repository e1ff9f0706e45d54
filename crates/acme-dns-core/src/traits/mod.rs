//! Core traits for challenge provisioning
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`DnsZone`]: Apply and remove a batch of challenge records
//! - [`ZoneStore`]: Record set access to one remote zone
//! - [`TokenCredential`]: Pre-resolved bearer-token credential

pub mod credential;
pub mod dns_zone;
pub mod zone_store;

pub use credential::{AccessToken, StaticTokenCredential, TokenCredential};
pub use dns_zone::{DnsZone, DnsZoneFactory, ReconcileReport, RecordChange, ZoneInitializer};
pub use zone_store::{CHALLENGE_TTL_SECS, TxtRecordSet, ZoneStore};
