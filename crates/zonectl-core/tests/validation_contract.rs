//! Architectural Contract Test: Validation Before Contact
//!
//! This test verifies that malformed requests are rejected before the
//! provider is called at all.
//!
//! Constraints verified:
//! - Negative TTLs, unsupported types, and empty names fail validation
//! - No provider call of any kind is made for an invalid request
//! - A record in a missing zone fails without mutations
//!
//! If this test fails, bad input can reach a live DNS service.

mod common;

use common::*;
use zonectl_core::{EngineConfig, FailureKind, RecordRequest, ZoneRequest};

#[tokio::test]
async fn invalid_record_requests_never_reach_the_provider() {
    let cases = [
        (
            RecordRequest::new("www.foo.com", "foo.com", "A")
                .with_values(["1.2.3.4"])
                .with_ttl(-5),
            "TTL cannot be less than zero",
        ),
        (
            RecordRequest::new("www.foo.com", "foo.com", "NAPTR").with_values(["x"]),
            "Record type is not supported",
        ),
    ];

    for (request, message) in cases {
        let (provider, _zone) = seeded("foo.com", &[]).await;
        let report = provider
            .engine(EngineConfig::live())
            .reconcile_record(&request)
            .await;

        assert!(report.failed());
        assert!(!report.changed());
        assert_eq!(report.outcome.failure, Some(FailureKind::Validation));
        assert_eq!(report.outcome.msg.as_deref(), Some(message));
        assert_eq!(provider.total_calls(), 0, "{:?}", request);
    }
}

#[tokio::test]
async fn empty_names_never_reach_the_provider() {
    let provider = FaultyProvider::default();
    let engine = provider.engine(EngineConfig::live());

    let record = engine
        .reconcile_record(&RecordRequest::new("", "foo.com", "A").with_values(["1.2.3.4"]))
        .await;
    assert_eq!(record.outcome.failure, Some(FailureKind::Validation));

    let zone = engine.reconcile_zone(&ZoneRequest::new("   ")).await;
    assert_eq!(zone.outcome.failure, Some(FailureKind::Validation));

    assert_eq!(provider.total_calls(), 0);
}

#[tokio::test]
async fn record_in_missing_zone_fails_without_mutation() {
    let provider = FaultyProvider::default();
    let report = provider
        .engine(EngineConfig::live())
        .reconcile_record(&RecordRequest::new("www.bar.com", "bar.com", "A").with_values(["1.2.3.4"]))
        .await;

    assert_eq!(report.outcome.failure, Some(FailureKind::MissingZone));
    assert_eq!(
        report.outcome.msg.as_deref(),
        Some("The zone was not found: bar.com.")
    );
    assert_eq!(provider.mutating_calls(), 0);
}
