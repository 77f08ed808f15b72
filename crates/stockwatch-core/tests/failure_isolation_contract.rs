//! Contract Test: Fetch Failure Isolation
//!
//! Constraints verified:
//! - A failed fetch logs the SKU as unavailable and leaves state untouched
//! - One failing SKU does not stop the others in the same cycle
//! - Any failed SKU ends daemon mode after the cycle
//! - Error notifications are opt-in and throttled per condition

mod common;

use common::*;
use stockwatch_core::traits::StateStore;
use stockwatch_core::{RoleMapping, RunOutcome, SkuOutcome, StateKey};
use tempfile::tempdir;

fn key(package_id: &str) -> StateKey {
    StateKey::new(package_id, region())
}

#[tokio::test]
async fn timeout_logs_unavailable_and_keeps_state() {
    let dir = tempdir().unwrap();
    let harness = Harness::new(Answer::Timeout);
    harness.store.save(&key("1202542"), "True").await.unwrap();

    let engine = harness.engine(
        config(vec![oled_512()]),
        RoleMapping::default(),
        Some(dir.path()),
    );

    let report = engine.run_cycle().await.unwrap();

    assert!(!report.all_succeeded());
    assert!(matches!(
        report.outcome_for("1202542"),
        Some(SkuOutcome::Failed { kind: "network", .. })
    ));
    assert_eq!(
        harness.store.load(&key("1202542")).await.unwrap(),
        Some("True".to_string())
    );
    assert!(harness.sink.messages().is_empty());

    let rows = data_rows(&dir.path().join("availability_DE_2025-03-01.csv"));
    assert_eq!(rows, vec!["1740819600,512,OLED,1202542,False".to_string()]);
}

#[tokio::test]
async fn parse_error_is_treated_like_timeout() {
    let harness = Harness::new(Answer::Malformed);
    let engine = harness.engine(config(vec![lcd_64()]), RoleMapping::default(), None);

    let report = engine.run_cycle().await.unwrap();

    assert!(matches!(
        report.outcome_for("903905"),
        Some(SkuOutcome::Failed { kind: "parse", .. })
    ));
    assert_eq!(harness.store.load(&key("903905")).await.unwrap(), None);
}

#[tokio::test]
async fn failing_sku_does_not_stop_the_rest_of_the_cycle() {
    let harness = Harness::new(Answer::Available);
    harness.inventory.script("903905", [Answer::Timeout]);
    harness.store.save(&key("1202542"), "False").await.unwrap();

    let engine = harness.engine(
        config(vec![lcd_64(), oled_512()]),
        RoleMapping::default(),
        None,
    );

    let report = engine.run_cycle().await.unwrap();

    assert_eq!(report.failed_packages(), vec!["903905".to_string()]);
    assert!(matches!(
        report.outcome_for("1202542"),
        Some(SkuOutcome::Changed { .. })
    ));
    assert_eq!(harness.inventory.call_count(), 2);
    assert_eq!(
        harness.sink.messages(),
        vec!["refurbished 512GB OLED steam deck available".to_string()]
    );
}

#[tokio::test]
async fn failed_cycle_ends_daemon_mode() {
    let harness = Harness::new(Answer::Available);
    harness.inventory.script("903905", [Answer::Timeout]);

    let engine = harness.engine(
        config(vec![lcd_64(), oled_512()]).with_interval_secs(600),
        RoleMapping::default(),
        None,
    );

    let outcome = engine.run().await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::CycleFailed {
            cycles: 1,
            failed: vec!["903905".to_string()],
        }
    );
    assert_eq!(harness.inventory.call_count(), 2);
}

#[tokio::test]
async fn error_notifications_are_off_by_default() {
    let harness = Harness::new(Answer::Timeout);
    let engine = harness.engine(config(vec![lcd_64()]), RoleMapping::default(), None);

    engine.run_cycle().await.unwrap();

    assert!(harness.sink.messages().is_empty());
}

#[tokio::test]
async fn error_notifications_are_throttled_per_condition() {
    let harness = Harness::new(Answer::Timeout);
    harness.inventory.script("1202542", [Answer::Malformed]);

    let engine = harness.engine(
        config(vec![lcd_64(), oled_512()]).with_error_notifications(true, 3600),
        RoleMapping::default(),
        None,
    );

    // network (first: sent) + parse (first: sent)
    engine.run_cycle().await.unwrap();
    let messages = harness.sink.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].starts_with("error checking 64GB LCD steam deck: Network error"));
    assert!(messages[1].starts_with("error checking 512GB OLED steam deck: Parse error"));

    // Both conditions again inside the window: suppressed
    harness.clock.advance_secs(600);
    engine.run_cycle().await.unwrap();
    assert_eq!(harness.sink.messages().len(), 2);

    // Window elapsed: network is sent again once, the second SKU's timeout is deduplicated
    harness.clock.advance_secs(3600);
    engine.run_cycle().await.unwrap();
    assert_eq!(harness.sink.messages().len(), 3);
}
