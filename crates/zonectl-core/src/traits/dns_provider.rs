// # DNS Provider Trait
//
// Defines the capability zonectl needs from a remote authoritative DNS service.
//
// ## Implementations
//
// - In-memory: `zonectl_core::memory::MemoryProvider`
// - Google Cloud DNS: `zonectl-provider-gcloud` crate
//
// ## Usage
//
// ```rust,ignore
// use zonectl_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     for zone in provider.list_zones().await? {
//         println!("{} ({})", zone.domain, zone.id);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::model::{Record, RecordData, RecordKey, Zone, ZoneAttributes};
use crate::name::Fqdn;

/// Trait for DNS provider implementations
///
/// Each method is a single remote operation. Implementations translate their
/// wire-level failures into [`ProviderError`] and return; they never decide
/// whether a failure is fatal, tolerable, or worth a rollback.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (a failed call surfaces immediately)
/// - ❌ Compare desired and actual state (owned by the reconcilers)
/// - ❌ Cache zone or record state between calls
/// - ❌ Honor dry-run (the engine never issues a mutating call in dry-run)
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List every zone visible to the credential
    ///
    /// Providers that paginate must follow every page.
    async fn list_zones(&self) -> Result<Vec<Zone>, ProviderError>;

    /// Fetch one record by identity key (`"<type>:<name>"`)
    ///
    /// # Returns
    ///
    /// - `Ok(Record)`: The record
    /// - `Err(ProviderError::NotFound)`: No such record
    /// - `Err(_)`: Any other failure, including a malformed name
    async fn get_record(&self, zone_id: &str, identity: &str) -> Result<Record, ProviderError>;

    /// Create a record in `zone`
    ///
    /// `ProviderError::Invalid` means the values do not fit the record type.
    async fn create_record(
        &self,
        zone: &Zone,
        key: &RecordKey,
        data: &RecordData,
    ) -> Result<Record, ProviderError>;

    /// Delete exactly this record
    async fn delete_record(&self, record: &Record) -> Result<(), ProviderError>;

    /// Create a zone
    ///
    /// # Returns
    ///
    /// - `Err(ProviderError::AlreadyExists)`: Someone else owns the domain now
    /// - `Err(ProviderError::Invalid)`: The domain or an attribute was rejected
    /// - `Err(ProviderError::ReservedName)`: The domain is not available
    async fn create_zone(
        &self,
        domain: &Fqdn,
        attributes: &ZoneAttributes,
    ) -> Result<Zone, ProviderError>;

    /// Delete a zone
    ///
    /// # Returns
    ///
    /// - `Err(ProviderError::NotFound)`: The zone is already gone
    /// - `Err(ProviderError::NotEmpty)`: The zone still holds user records
    async fn delete_zone(&self, zone: &Zone) -> Result<(), ProviderError>;

    /// List every record in a zone, system records included
    async fn list_records(&self, zone: &Zone) -> Result<Vec<Record>, ProviderError>;

    /// Record types this provider accepts
    fn supported_record_types(&self) -> &[&'static str];

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    ///
    /// # Returns
    ///
    /// A boxed DnsProvider trait object
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
