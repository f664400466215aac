//! Test doubles and common utilities for architecture contract tests
//!
//! `FaultyProvider` wraps the in-memory provider, counts every call, and can
//! be scripted to fail specific calls so the race and rollback paths can be
//! driven deterministically.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use zonectl_core::model::{RecordData, RecordKey, ZoneAttributes};
use zonectl_core::traits::DnsProvider;
use zonectl_core::{
    Engine, EngineConfig, Fqdn, MemoryProvider, ProviderError, Record, Zone,
};

/// Per-method call counters, shared between clones
#[derive(Debug, Default)]
pub struct CallCounts {
    pub list_zones: AtomicUsize,
    pub get_record: AtomicUsize,
    pub create_record: AtomicUsize,
    pub delete_record: AtomicUsize,
    pub create_zone: AtomicUsize,
    pub delete_zone: AtomicUsize,
    pub list_records: AtomicUsize,
}

/// Scripted failures
///
/// `create_record` failures are keyed by the 1-based call number so a test
/// can let the first create through and fail the second.
#[derive(Debug, Default)]
struct Faults {
    create_record: HashMap<usize, ProviderError>,
    delete_record: Option<ProviderError>,
    get_record: Option<ProviderError>,
    create_zone: Option<ProviderError>,
    delete_zone: Option<ProviderError>,
    list_zones: Option<ProviderError>,
}

/// A DnsProvider that records calls and fails on demand
///
/// Clones share state, counters, and faults, so a test can hand one clone to
/// the engine and inspect the other.
#[derive(Clone, Default)]
pub struct FaultyProvider {
    inner: MemoryProvider,
    calls: Arc<CallCounts>,
    faults: Arc<Mutex<Faults>>,
}

impl FaultyProvider {
    pub fn new(inner: MemoryProvider) -> Self {
        Self {
            inner,
            calls: Arc::default(),
            faults: Arc::default(),
        }
    }

    /// The wrapped provider, for setup and inspection without counting
    pub fn memory(&self) -> &MemoryProvider {
        &self.inner
    }

    /// Fail the `nth` (1-based) `create_record` call with `error`
    pub fn fail_create_record(&self, nth: usize, error: ProviderError) {
        self.faults.lock().unwrap().create_record.insert(nth, error);
    }

    pub fn fail_delete_record(&self, error: ProviderError) {
        self.faults.lock().unwrap().delete_record = Some(error);
    }

    pub fn fail_get_record(&self, error: ProviderError) {
        self.faults.lock().unwrap().get_record = Some(error);
    }

    pub fn fail_create_zone(&self, error: ProviderError) {
        self.faults.lock().unwrap().create_zone = Some(error);
    }

    pub fn fail_delete_zone(&self, error: ProviderError) {
        self.faults.lock().unwrap().delete_zone = Some(error);
    }

    pub fn fail_list_zones(&self, error: ProviderError) {
        self.faults.lock().unwrap().list_zones = Some(error);
    }

    pub fn calls(&self) -> &CallCounts {
        &self.calls
    }

    /// Number of calls that could have changed remote state
    pub fn mutating_calls(&self) -> usize {
        self.calls.create_record.load(Ordering::SeqCst)
            + self.calls.delete_record.load(Ordering::SeqCst)
            + self.calls.create_zone.load(Ordering::SeqCst)
            + self.calls.delete_zone.load(Ordering::SeqCst)
    }

    /// Number of calls of any kind
    pub fn total_calls(&self) -> usize {
        self.mutating_calls()
            + self.calls.list_zones.load(Ordering::SeqCst)
            + self.calls.get_record.load(Ordering::SeqCst)
            + self.calls.list_records.load(Ordering::SeqCst)
    }

    /// Engine over a clone of this provider
    pub fn engine(&self, config: EngineConfig) -> Engine {
        Engine::new(Box::new(self.clone()), config)
    }
}

#[async_trait]
impl DnsProvider for FaultyProvider {
    async fn list_zones(&self) -> Result<Vec<Zone>, ProviderError> {
        self.calls.list_zones.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.faults.lock().unwrap().list_zones.clone() {
            return Err(err);
        }
        self.inner.list_zones().await
    }

    async fn get_record(&self, zone_id: &str, identity: &str) -> Result<Record, ProviderError> {
        self.calls.get_record.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.faults.lock().unwrap().get_record.clone() {
            return Err(err);
        }
        self.inner.get_record(zone_id, identity).await
    }

    async fn create_record(
        &self,
        zone: &Zone,
        key: &RecordKey,
        data: &RecordData,
    ) -> Result<Record, ProviderError> {
        let n = self.calls.create_record.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(err) = self.faults.lock().unwrap().create_record.remove(&n) {
            return Err(err);
        }
        self.inner.create_record(zone, key, data).await
    }

    async fn delete_record(&self, record: &Record) -> Result<(), ProviderError> {
        self.calls.delete_record.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.faults.lock().unwrap().delete_record.clone() {
            return Err(err);
        }
        self.inner.delete_record(record).await
    }

    async fn create_zone(
        &self,
        domain: &Fqdn,
        attributes: &ZoneAttributes,
    ) -> Result<Zone, ProviderError> {
        self.calls.create_zone.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.faults.lock().unwrap().create_zone.clone() {
            return Err(err);
        }
        self.inner.create_zone(domain, attributes).await
    }

    async fn delete_zone(&self, zone: &Zone) -> Result<(), ProviderError> {
        self.calls.delete_zone.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.faults.lock().unwrap().delete_zone.clone() {
            return Err(err);
        }
        self.inner.delete_zone(zone).await
    }

    async fn list_records(&self, zone: &Zone) -> Result<Vec<Record>, ProviderError> {
        self.calls.list_records.fetch_add(1, Ordering::SeqCst);
        self.inner.list_records(zone).await
    }

    fn supported_record_types(&self) -> &[&'static str] {
        self.inner.supported_record_types()
    }

    fn provider_name(&self) -> &'static str {
        "faulty"
    }
}

pub fn fqdn(name: &str) -> Fqdn {
    Fqdn::new(name).expect("valid test name")
}

/// Provider holding `domain` with the given user records
///
/// Each record is `(type, name, values)` with a TTL of 300.
pub async fn seeded(domain: &str, records: &[(&str, &str, &[&str])]) -> (FaultyProvider, Zone) {
    let memory = MemoryProvider::new();
    let zone = memory
        .create_zone(&fqdn(domain), &ZoneAttributes::default())
        .await
        .expect("zone creation succeeds");

    for (record_type, name, values) in records {
        memory
            .create_record(
                &zone,
                &RecordKey::new(*record_type, fqdn(name)),
                &RecordData::new(300, values.iter().map(|v| v.to_string()).collect()),
            )
            .await
            .expect("record creation succeeds");
    }

    (FaultyProvider::new(memory), zone)
}

/// Current data of a record, or `None` if it does not exist
pub async fn stored(provider: &FaultyProvider, zone: &Zone, record_type: &str, name: &str) -> Option<RecordData> {
    let key = RecordKey::new(record_type, fqdn(name));
    provider
        .memory()
        .get_record(&zone.id, &key.identity())
        .await
        .ok()
        .map(|record| record.data)
}
