//! Architectural Contract Test: Challenge Record Removal
//!
//! Constraints verified:
//! - Removing records that are already gone succeeds as a no-op
//! - A failed delete does not stop the remaining deletes
//! - A failed read does not stop the remaining deletes
//! - An identifier outside the zone does not stop the remaining deletes
//! - Every failed record is reported
//! - The whole record set at a challenge name is deleted
//!
//! If this test fails, cleanup can leave stale challenge records behind.

mod common;

use acme_dns_core::{DnsZone, Error, Order, RecordChange, RecordOperation, TxtRecordSet};
use common::*;

#[tokio::test]
async fn removing_externally_deleted_records_is_a_no_op() {
    let (zone, store) = scripted_zone();
    let mut order = Order::new().with_challenge("www.example.com", "abc123");

    zone.set_challenge_records(&mut order).await.unwrap();
    store.zone().remove("_acme-challenge.www").await;

    let report = zone
        .remove_challenge_records(&mut order)
        .await
        .expect("removal of absent record succeeds");

    assert_eq!(
        report.change_for("_acme-challenge.www"),
        Some(&RecordChange::Absent)
    );
    assert!(
        !store.calls().iter().any(|c| c.starts_with("delete ")),
        "nothing to delete"
    );
}

#[tokio::test]
async fn removing_twice_succeeds() {
    let (zone, _store) = scripted_zone();
    let mut order = Order::new().with_challenge("www.example.com", "abc123");

    zone.set_challenge_records(&mut order).await.unwrap();
    zone.remove_challenge_records(&mut order).await.unwrap();
    let report = zone.remove_challenge_records(&mut order).await.unwrap();

    assert_eq!(report.mutations(), 0);
}

#[tokio::test]
async fn failed_delete_does_not_block_the_rest() {
    let (zone, store) = scripted_zone();
    let mut order = Order::new()
        .with_challenge("a.example.com", "1")
        .with_challenge("b.example.com", "2")
        .with_challenge("c.example.com", "3");

    zone.set_challenge_records(&mut order).await.unwrap();
    store.fail_deletes_for("_acme-challenge.a");

    let err = zone.remove_challenge_records(&mut order).await.unwrap_err();

    match &err {
        Error::Removal(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].record(), Some("_acme-challenge.a"));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    assert!(store.zone().get("_acme-challenge.a").await.is_some());
    assert!(store.zone().get("_acme-challenge.b").await.is_none());
    assert!(store.zone().get("_acme-challenge.c").await.is_none());
}

#[tokio::test]
async fn whole_record_set_is_deleted() {
    let (zone, store) = scripted_zone();
    store
        .zone()
        .insert(TxtRecordSet::challenge("_acme-challenge.www", "sibling"))
        .await;

    let mut order = Order::new().with_challenge("www.example.com", "mine");
    zone.set_challenge_records(&mut order).await.unwrap();
    zone.remove_challenge_records(&mut order).await.unwrap();

    // Sibling values at the same name go with the set
    assert!(store.zone().get("_acme-challenge.www").await.is_none());
}

#[tokio::test]
async fn failed_read_does_not_block_the_rest() {
    let (zone, store) = scripted_zone();
    let mut order = Order::new()
        .with_challenge("a.example.com", "1")
        .with_challenge("b.example.com", "2");

    zone.set_challenge_records(&mut order).await.unwrap();
    store.fail_reads_for("_acme-challenge.a");

    let err = zone.remove_challenge_records(&mut order).await.unwrap_err();

    match &err {
        Error::Removal(failures) => {
            assert_eq!(failures.len(), 1);
            assert!(matches!(
                failures[0],
                Error::RecordOperation {
                    operation: RecordOperation::Read,
                    ..
                }
            ));
            assert_eq!(failures[0].record(), Some("_acme-challenge.a"));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    assert!(store.zone().get("_acme-challenge.a").await.is_some());
    assert!(store.zone().get("_acme-challenge.b").await.is_none());
    assert!(!store.calls().contains(&"delete _acme-challenge.a".to_string()));
}

#[tokio::test]
async fn out_of_zone_identifier_does_not_block_cleanup() {
    let (zone, store) = scripted_zone();
    store
        .zone()
        .insert(TxtRecordSet::challenge("_acme-challenge.www", "abc123"))
        .await;

    // Never went through set, so names are derived during removal
    let mut order = Order::new()
        .with_challenge("www.example.net", "stray")
        .with_challenge("www.example.com", "abc123");

    let err = zone.remove_challenge_records(&mut order).await.unwrap_err();

    match &err {
        Error::Removal(failures) => {
            assert_eq!(failures.len(), 1);
            assert!(matches!(failures[0], Error::Mapping { .. }));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(store.zone().is_empty().await);
}
