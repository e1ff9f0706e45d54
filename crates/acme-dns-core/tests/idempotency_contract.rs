//! Architectural Contract Test: Idempotent Reconciliation
//!
//! Constraints verified:
//! - Setting the same order twice leaves the same zone state as setting it once
//! - The second run performs reads only
//! - A batch that failed half-way can be re-run to completion
//!
//! If this test fails, retries by the ACME driver are no longer safe.

mod common;

use acme_dns_core::{DnsZone, Error, Order, RecordChange, RecordOperation};
use common::*;

fn two_challenge_order() -> Order {
    Order::new()
        .with_challenge("www.example.com", "token-www")
        .with_challenge("api.example.com", "token-api")
}

#[tokio::test]
async fn setting_twice_matches_setting_once() {
    let (zone, store) = scripted_zone();
    let mut order = two_challenge_order();

    zone.set_challenge_records(&mut order).await.expect("first set succeeds");
    let after_first = store.zone().get("_acme-challenge.www").await;

    let report = zone
        .set_challenge_records(&mut order)
        .await
        .expect("second set succeeds");

    assert_eq!(store.zone().get("_acme-challenge.www").await, after_first);
    assert_eq!(
        store.zone().get("_acme-challenge.www").await.unwrap().values,
        vec!["token-www".to_string()],
        "no duplicate TXT values"
    );
    assert_eq!(report.mutations(), 0);
    assert!(
        report
            .changes
            .iter()
            .all(|(_, change)| *change == RecordChange::Unchanged)
    );
}

#[tokio::test]
async fn second_run_only_reads() {
    let (zone, store) = scripted_zone();
    let mut order = two_challenge_order();

    zone.set_challenge_records(&mut order).await.unwrap();
    let mutations_after_first = store.mutations().len();
    zone.set_challenge_records(&mut order).await.unwrap();

    assert_eq!(mutations_after_first, 2);
    assert_eq!(store.mutations().len(), 2, "second run must not write");
}

#[tokio::test]
async fn partial_failure_can_be_retried() {
    let (zone, store) = scripted_zone();
    let mut order = two_challenge_order();

    store.fail_writes_for("_acme-challenge.api");
    let err = zone.set_challenge_records(&mut order).await.unwrap_err();

    match err {
        Error::RecordOperation {
            operation, record, ..
        } => {
            assert_eq!(operation, RecordOperation::Create);
            assert_eq!(record, "_acme-challenge.api");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // First challenge was applied, second was not
    assert!(store.zone().get("_acme-challenge.www").await.is_some());
    assert!(store.zone().get("_acme-challenge.api").await.is_none());

    store.heal();
    let report = zone.set_challenge_records(&mut order).await.expect("retry succeeds");

    assert_eq!(
        report.change_for("_acme-challenge.www"),
        Some(&RecordChange::Unchanged)
    );
    assert_eq!(
        report.change_for("_acme-challenge.api"),
        Some(&RecordChange::Created)
    );
}

#[tokio::test]
async fn every_write_is_preceded_by_a_fresh_read() {
    let (zone, store) = scripted_zone();
    let mut order = two_challenge_order();

    zone.set_challenge_records(&mut order).await.unwrap();

    assert_eq!(
        store.calls(),
        vec![
            "read _acme-challenge.www",
            "write _acme-challenge.www",
            "read _acme-challenge.api",
            "write _acme-challenge.api",
        ]
    );
}
