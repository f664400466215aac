//! Minimal embedding example for zonectl-core
//!
//! Uses the engine as a library with a custom provider: an in-memory backend
//! wrapped to print every call, so the delete-then-create of an overwrite is
//! visible.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use zonectl_core::model::{Record, RecordData, RecordKey, Zone, ZoneAttributes};
use zonectl_core::traits::DnsProvider;
use zonectl_core::{
    DesiredState, Engine, EngineConfig, Fqdn, MemoryProvider, ProviderError, RecordRequest,
    ZoneRequest,
};

/// Custom DNS provider for embedded usage
#[derive(Clone, Default)]
struct EmbeddedProvider {
    inner: MemoryProvider,
    mutations: Arc<AtomicUsize>,
}

impl EmbeddedProvider {
    fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn mutated(&self, what: std::fmt::Arguments<'_>) {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        println!("[Embedded] {}", what);
    }
}

#[async_trait::async_trait]
impl DnsProvider for EmbeddedProvider {
    async fn list_zones(&self) -> Result<Vec<Zone>, ProviderError> {
        self.inner.list_zones().await
    }

    async fn get_record(&self, zone_id: &str, identity: &str) -> Result<Record, ProviderError> {
        self.inner.get_record(zone_id, identity).await
    }

    async fn create_record(
        &self,
        zone: &Zone,
        key: &RecordKey,
        data: &RecordData,
    ) -> Result<Record, ProviderError> {
        self.mutated(format_args!("create {} {:?}", key, data.values));
        self.inner.create_record(zone, key, data).await
    }

    async fn delete_record(&self, record: &Record) -> Result<(), ProviderError> {
        self.mutated(format_args!("delete {}", record.key));
        self.inner.delete_record(record).await
    }

    async fn create_zone(
        &self,
        domain: &Fqdn,
        attributes: &ZoneAttributes,
    ) -> Result<Zone, ProviderError> {
        self.mutated(format_args!("create zone {}", domain));
        self.inner.create_zone(domain, attributes).await
    }

    async fn delete_zone(&self, zone: &Zone) -> Result<(), ProviderError> {
        self.mutated(format_args!("delete zone {}", zone.domain));
        self.inner.delete_zone(zone).await
    }

    async fn list_records(&self, zone: &Zone) -> Result<Vec<Record>, ProviderError> {
        self.inner.list_records(zone).await
    }

    fn supported_record_types(&self) -> &[&'static str] {
        self.inner.supported_record_types()
    }

    fn provider_name(&self) -> &'static str {
        "embedded"
    }
}

fn print_report<T: serde::Serialize>(step: &str, report: &T) -> Result<(), serde_json::Error> {
    println!("{}\n{}\n", step, serde_json::to_string_pretty(report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Embedded zonectl-core Example ===\n");

    let provider = EmbeddedProvider::default();
    let engine = Engine::new(Box::new(provider.clone()), EngineConfig::live());

    let zone = ZoneRequest::new("example.com").with_description("embedded demo");
    print_report("1. Create zone", &engine.reconcile_zone(&zone).await)?;

    let www = RecordRequest::new("www.example.com", "example.com", "A").with_values(["192.0.2.1"]);
    print_report("2. Create record", &engine.reconcile_record(&www).await)?;
    print_report("3. Same record again", &engine.reconcile_record(&www).await)?;

    let moved = www.clone().with_values(["192.0.2.2"]);
    print_report("4. Change without overwrite", &engine.reconcile_record(&moved).await)?;

    let moved = moved.with_overwrite(true);
    print_report("5. Change with overwrite", &engine.reconcile_record(&moved).await)?;

    let preview = Engine::new(Box::new(provider.clone()), EngineConfig::dry_run());
    let before = provider.mutation_count();
    let removal = zone.clone().with_state(DesiredState::Absent);
    print_report("6. Preview zone removal", &preview.reconcile_zone(&removal).await)?;
    assert_eq!(provider.mutation_count(), before);

    let gone = moved.with_state(DesiredState::Absent);
    print_report("7. Remove record", &engine.reconcile_record(&gone).await)?;
    print_report("8. Remove zone", &engine.reconcile_zone(&removal).await)?;

    println!("=== Embedding Successful ===");
    println!("{} mutating calls in total", provider.mutation_count());

    Ok(())
}
