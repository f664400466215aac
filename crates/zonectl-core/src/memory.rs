// # Memory Provider
//
// In-memory implementation of DnsProvider.
//
// ## Purpose
//
// Behaves like an authoritative service without a network: zones carry their
// NS and SOA records from birth, duplicate creations and non-empty deletions
// are refused, reserved domains cannot be claimed, and record values are
// checked against their type. Used by the contract tests, the embedding demo,
// and the CLI's offline `memory` provider.
//
// ## Persistence
//
// None. A provider can be seeded from a JSON snapshot and can produce one,
// but nothing is written back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::ProviderConfig;
use crate::error::{Error, ProviderError};
use crate::model::{DEFAULT_TTL, Record, RecordData, RecordKey, Zone, ZoneAttributes};
use crate::name::Fqdn;
use crate::traits::{DnsProvider, DnsProviderFactory};

/// Record types the memory provider accepts
pub const SUPPORTED_RECORD_TYPES: &[&str] = &[
    "A", "AAAA", "CAA", "CNAME", "MX", "NS", "PTR", "SOA", "SPF", "SRV", "TXT",
];

const NAME_SERVERS: [&str; 2] = ["ns1.memory.zonectl.", "ns2.memory.zonectl."];
const SYSTEM_TTL: u32 = 21600;

/// In-memory DNS provider
///
/// Cloning is cheap and clones share state.
///
/// # Example
///
/// ```rust,no_run
/// use zonectl_core::memory::MemoryProvider;
/// use zonectl_core::model::ZoneAttributes;
/// use zonectl_core::{DnsProvider, Fqdn};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let provider = MemoryProvider::new();
///     let zone = provider
///         .create_zone(&Fqdn::new("example.com")?, &ZoneAttributes::default())
///         .await?;
///
///     // NS and SOA come with every zone
///     assert_eq!(provider.list_records(&zone).await?.len(), 2);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    zones: BTreeMap<String, MemoryZone>,
    reserved: BTreeSet<Fqdn>,
}

#[derive(Debug)]
struct MemoryZone {
    zone: Zone,
    records: BTreeMap<String, Record>,
}

impl MemoryProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider that refuses to create zones for `domains`
    pub fn with_reserved<I>(domains: I) -> Self
    where
        I: IntoIterator<Item = Fqdn>,
    {
        let inner = Inner {
            reserved: domains.into_iter().collect(),
            ..Inner::default()
        };
        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    /// Build a provider holding the zones and records in `snapshot`
    ///
    /// Every entry goes through the same checks as a live creation.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, ProviderError> {
        let mut inner = Inner {
            reserved: snapshot.reserved.iter().cloned().collect(),
            ..Inner::default()
        };

        for entry in &snapshot.zones {
            let zone = inner.create_zone(
                &entry.domain,
                &ZoneAttributes {
                    description: entry.description.clone(),
                },
                false,
            )?;
            for record in &entry.records {
                inner.create_record(
                    &zone,
                    &RecordKey::new(record.record_type.clone(), record.name.clone()),
                    &RecordData::new(record.ttl, record.values.clone()),
                )?;
            }
        }

        Ok(Self {
            inner: Arc::new(RwLock::new(inner)),
        })
    }

    /// Load a snapshot file and build a provider from it
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        Ok(Self::from_snapshot(&snapshot)?)
    }

    /// Capture the current user-visible state (system records excluded)
    pub async fn snapshot(&self) -> Snapshot {
        let guard = self.inner.read().await;
        let zones = guard
            .zones
            .values()
            .map(|z| SnapshotZone {
                domain: z.zone.domain.clone(),
                description: z.zone.attributes.description.clone(),
                records: z
                    .records
                    .values()
                    .filter(|r| !is_apex_system_record(&z.zone, &r.key))
                    .map(|r| SnapshotRecord {
                        record_type: r.key.record_type.clone(),
                        name: r.key.name.clone(),
                        ttl: r.data.ttl,
                        values: r.data.values.clone(),
                    })
                    .collect(),
            })
            .collect();

        Snapshot {
            zones,
            reserved: guard.reserved.iter().cloned().collect(),
        }
    }

    /// Number of zones held
    pub async fn zone_count(&self) -> usize {
        self.inner.read().await.zones.len()
    }
}

impl Inner {
    fn zone(&self, zone_id: &str) -> Result<&MemoryZone, ProviderError> {
        self.zones
            .get(zone_id)
            .ok_or_else(|| ProviderError::NotFound(format!("zone {}", zone_id)))
    }

    fn zone_mut(&mut self, zone_id: &str) -> Result<&mut MemoryZone, ProviderError> {
        self.zones
            .get_mut(zone_id)
            .ok_or_else(|| ProviderError::NotFound(format!("zone {}", zone_id)))
    }

    fn create_zone(
        &mut self,
        domain: &Fqdn,
        attributes: &ZoneAttributes,
        check_reserved: bool,
    ) -> Result<Zone, ProviderError> {
        if self.zones.values().any(|z| &z.zone.domain == domain) {
            return Err(ProviderError::AlreadyExists(domain.to_string()));
        }
        if check_reserved && self.reserved.contains(domain) {
            return Err(ProviderError::ReservedName(domain.to_string()));
        }

        let id = self.unique_zone_id(domain);
        let zone = Zone {
            id: id.clone(),
            domain: domain.clone(),
            attributes: attributes.clone(),
        };

        let mut records = BTreeMap::new();
        for (record_type, values) in [
            ("NS", NAME_SERVERS.iter().map(|s| s.to_string()).collect::<Vec<_>>()),
            (
                "SOA",
                vec![format!(
                    "{} hostmaster.{} 1 21600 3600 259200 300",
                    NAME_SERVERS[0], domain
                )],
            ),
        ] {
            let record = Record {
                zone_id: id.clone(),
                key: RecordKey::new(record_type, domain.clone()),
                data: RecordData::new(SYSTEM_TTL, values),
            };
            records.insert(record.key.identity(), record);
        }

        self.zones.insert(
            id,
            MemoryZone {
                zone: zone.clone(),
                records,
            },
        );
        Ok(zone)
    }

    fn unique_zone_id(&self, domain: &Fqdn) -> String {
        let base = domain.trimmed().to_ascii_lowercase().replace('.', "-");
        let mut id = base.clone();
        let mut n = 2;
        while self.zones.contains_key(&id) {
            id = format!("{}-{}", base, n);
            n += 1;
        }
        id
    }

    fn create_record(
        &mut self,
        zone: &Zone,
        key: &RecordKey,
        data: &RecordData,
    ) -> Result<Record, ProviderError> {
        let entry = self.zone_mut(&zone.id)?;

        if !key.name.is_within(&entry.zone.domain) {
            return Err(ProviderError::Invalid(format!(
                "{} is not within zone {}",
                key.name, entry.zone.domain
            )));
        }
        if key.record_type == "SOA" {
            return Err(ProviderError::Invalid(
                "SOA records are managed by the zone".to_string(),
            ));
        }
        validate_values(key, data)?;

        let identity = key.identity();
        if entry.records.contains_key(&identity) {
            return Err(ProviderError::AlreadyExists(identity));
        }

        let record = Record {
            zone_id: entry.zone.id.clone(),
            key: key.clone(),
            data: data.clone(),
        };
        entry.records.insert(identity, record.clone());
        Ok(record)
    }
}

fn is_apex_system_record(zone: &Zone, key: &RecordKey) -> bool {
    key.is_system_type() && key.name == zone.domain
}

/// Per-type value checks, roughly what an authoritative service enforces
fn validate_values(key: &RecordKey, data: &RecordData) -> Result<(), ProviderError> {
    let invalid = |value: &str| {
        Err(ProviderError::Invalid(format!(
            "'{}' is not a valid {} value",
            value, key.record_type
        )))
    };

    if !SUPPORTED_RECORD_TYPES.contains(&key.record_type.as_str()) {
        return Err(ProviderError::Invalid(format!(
            "unsupported record type {}",
            key.record_type
        )));
    }
    if data.values.is_empty() {
        return Err(ProviderError::Invalid(format!(
            "{} needs at least one value",
            key.identity()
        )));
    }
    if key.record_type == "CNAME" && data.values.len() > 1 {
        return Err(ProviderError::Invalid(format!(
            "{} can only hold one value",
            key.identity()
        )));
    }

    for value in &data.values {
        let ok = match key.record_type.as_str() {
            "A" => value.parse::<Ipv4Addr>().is_ok(),
            "AAAA" => value.parse::<Ipv6Addr>().is_ok(),
            "CNAME" | "NS" | "PTR" => is_hostname(value),
            "MX" => matches!(
                value.split_whitespace().collect::<Vec<_>>()[..],
                [pref, host] if pref.parse::<u16>().is_ok() && is_hostname(host)
            ),
            "SRV" => matches!(
                value.split_whitespace().collect::<Vec<_>>()[..],
                [prio, weight, port, target]
                    if prio.parse::<u16>().is_ok()
                        && weight.parse::<u16>().is_ok()
                        && port.parse::<u16>().is_ok()
                        && is_hostname(target)
            ),
            _ => !value.trim().is_empty(),
        };
        if !ok {
            return invalid(value);
        }
    }
    Ok(())
}

/// Name-bearing values must be fully qualified
fn is_hostname(value: &str) -> bool {
    value.ends_with('.') && Fqdn::new(value).is_ok()
}

#[async_trait]
impl DnsProvider for MemoryProvider {
    async fn list_zones(&self) -> Result<Vec<Zone>, ProviderError> {
        let guard = self.inner.read().await;
        Ok(guard.zones.values().map(|z| z.zone.clone()).collect())
    }

    async fn get_record(&self, zone_id: &str, identity: &str) -> Result<Record, ProviderError> {
        let guard = self.inner.read().await;
        let entry = guard.zone(zone_id)?;
        let key = RecordKey::parse_identity(identity)
            .map_err(|e| ProviderError::Invalid(e.to_string()))?;
        entry
            .records
            .get(&key.identity())
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(identity.to_string()))
    }

    async fn create_record(
        &self,
        zone: &Zone,
        key: &RecordKey,
        data: &RecordData,
    ) -> Result<Record, ProviderError> {
        let mut guard = self.inner.write().await;
        guard.create_record(zone, key, data)
    }

    async fn delete_record(&self, record: &Record) -> Result<(), ProviderError> {
        let mut guard = self.inner.write().await;
        let entry = guard.zone_mut(&record.zone_id)?;
        let identity = record.key.identity();

        if is_apex_system_record(&entry.zone, &record.key) {
            return Err(ProviderError::Invalid(format!(
                "{} is managed by the zone",
                identity
            )));
        }

        match entry.records.get(&identity) {
            None => Err(ProviderError::NotFound(identity)),
            Some(stored) if stored.data != record.data => Err(ProviderError::Other {
                code: Some(412),
                reason: Some("conditionNotMet".to_string()),
                message: format!("{} does not match the stored record", identity),
            }),
            Some(_) => {
                entry.records.remove(&identity);
                Ok(())
            }
        }
    }

    async fn create_zone(
        &self,
        domain: &Fqdn,
        attributes: &ZoneAttributes,
    ) -> Result<Zone, ProviderError> {
        let mut guard = self.inner.write().await;
        guard.create_zone(domain, attributes, true)
    }

    async fn delete_zone(&self, zone: &Zone) -> Result<(), ProviderError> {
        let mut guard = self.inner.write().await;
        let entry = guard.zone(&zone.id)?;
        let user_records = entry
            .records
            .values()
            .filter(|r| !is_apex_system_record(&entry.zone, &r.key))
            .count();
        if user_records > 0 {
            return Err(ProviderError::NotEmpty(zone.domain.to_string()));
        }
        guard.zones.remove(&zone.id);
        Ok(())
    }

    async fn list_records(&self, zone: &Zone) -> Result<Vec<Record>, ProviderError> {
        let guard = self.inner.read().await;
        Ok(guard.zone(&zone.id)?.records.values().cloned().collect())
    }

    fn supported_record_types(&self) -> &[&'static str] {
        SUPPORTED_RECORD_TYPES
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

/// Serializable view of a memory provider's contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub zones: Vec<SnapshotZone>,
    /// Domains that cannot be created
    #[serde(default)]
    pub reserved: Vec<Fqdn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotZone {
    pub domain: Fqdn,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub records: Vec<SnapshotRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: Fqdn,
    #[serde(default = "default_ttl")]
    pub ttl: u32,
    pub values: Vec<String>,
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

/// Factory for creating memory providers
pub struct MemoryProviderFactory;

impl DnsProviderFactory for MemoryProviderFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>, Error> {
        match config {
            ProviderConfig::Memory { snapshot: None } => Ok(Box::new(MemoryProvider::new())),
            ProviderConfig::Memory {
                snapshot: Some(path),
            } => Ok(Box::new(MemoryProvider::load(path)?)),
            _ => Err(Error::config("Invalid config for memory provider")),
        }
    }
}

/// Register the memory provider with a registry
pub fn register(registry: &crate::ProviderRegistry) {
    registry.register_provider("memory", Box::new(MemoryProviderFactory));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fqdn(name: &str) -> Fqdn {
        Fqdn::new(name).unwrap()
    }

    #[tokio::test]
    async fn zones_start_with_system_records() {
        let provider = MemoryProvider::new();
        let zone = provider
            .create_zone(&fqdn("example.com"), &ZoneAttributes::default())
            .await
            .unwrap();

        assert_eq!(zone.id, "example-com");
        let records = provider.list_records(&zone).await.unwrap();
        let types: Vec<_> = records.iter().map(|r| r.key.record_type.as_str()).collect();
        assert_eq!(types, vec!["NS", "SOA"]);
    }

    #[tokio::test]
    async fn duplicate_and_reserved_zones_are_refused() {
        let provider = MemoryProvider::with_reserved([fqdn("example.org")]);
        provider
            .create_zone(&fqdn("example.com"), &ZoneAttributes::default())
            .await
            .unwrap();

        assert!(matches!(
            provider
                .create_zone(&fqdn("example.com."), &ZoneAttributes::default())
                .await,
            Err(ProviderError::AlreadyExists(_))
        ));
        assert!(matches!(
            provider
                .create_zone(&fqdn("example.org"), &ZoneAttributes::default())
                .await,
            Err(ProviderError::ReservedName(_))
        ));
    }

    #[tokio::test]
    async fn record_values_are_checked_per_type() {
        let provider = MemoryProvider::new();
        let zone = provider
            .create_zone(&fqdn("example.com"), &ZoneAttributes::default())
            .await
            .unwrap();

        let cases = [
            ("A", "1.2.3.4", true),
            ("A", "foo.example.com.", false),
            ("AAAA", "2001:db8::1", true),
            ("AAAA", "1.2.3.4", false),
            ("CNAME", "foo.example.com.", true),
            ("CNAME", "foo.example.com", false),
            ("MX", "10 mail.example.com.", true),
            ("MX", "mail.example.com.", false),
            ("SRV", "10 5 5060 sip.example.com.", true),
            ("TXT", "v=spf1 -all", true),
        ];

        for (i, (record_type, value, ok)) in cases.into_iter().enumerate() {
            let key = RecordKey::new(record_type, fqdn(&format!("r{}.example.com", i)));
            let result = provider
                .create_record(&zone, &key, &RecordData::new(300, vec![value.into()]))
                .await;
            assert_eq!(result.is_ok(), ok, "{} {}", record_type, value);
            if !ok {
                assert!(matches!(result, Err(ProviderError::Invalid(_))));
            }
        }
    }

    #[tokio::test]
    async fn records_outside_the_zone_are_refused() {
        let provider = MemoryProvider::new();
        let zone = provider
            .create_zone(&fqdn("example.com"), &ZoneAttributes::default())
            .await
            .unwrap();
        let key = RecordKey::new("A", fqdn("www.example.net"));
        assert!(matches!(
            provider
                .create_record(&zone, &key, &RecordData::new(300, vec!["1.2.3.4".into()]))
                .await,
            Err(ProviderError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn delete_zone_refuses_user_records() {
        let provider = MemoryProvider::new();
        let zone = provider
            .create_zone(&fqdn("example.com"), &ZoneAttributes::default())
            .await
            .unwrap();
        let record = provider
            .create_record(
                &zone,
                &RecordKey::new("TXT", fqdn("example.com")),
                &RecordData::new(300, vec!["hello".into()]),
            )
            .await
            .unwrap();

        assert!(matches!(
            provider.delete_zone(&zone).await,
            Err(ProviderError::NotEmpty(_))
        ));

        provider.delete_record(&record).await.unwrap();
        provider.delete_zone(&zone).await.unwrap();
        assert!(matches!(
            provider.delete_zone(&zone).await,
            Err(ProviderError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn snapshot_round_trip_through_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "zones": [{{
                    "domain": "example.com",
                    "description": "primary",
                    "records": [{{"type": "A", "name": "www.example.com", "values": ["1.2.3.4"]}}]
                }}]
            }}"#
        )
        .unwrap();

        let provider = MemoryProvider::load(file.path()).unwrap();
        let snapshot = provider.snapshot().await;

        assert_eq!(snapshot.zones.len(), 1);
        assert_eq!(snapshot.zones[0].domain.as_str(), "example.com.");
        assert_eq!(snapshot.zones[0].description, "primary");
        assert_eq!(snapshot.zones[0].records.len(), 1);
        assert_eq!(snapshot.zones[0].records[0].ttl, 300);
    }

    #[test]
    fn snapshot_with_bad_record_is_rejected() {
        let snapshot: Snapshot = serde_json::from_str(
            r#"{"zones": [{"domain": "example.com",
                "records": [{"type": "A", "name": "www.example.com", "values": ["nope"]}]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            MemoryProvider::from_snapshot(&snapshot),
            Err(ProviderError::Invalid(_))
        ));
    }

    #[test]
    fn factory_rejects_foreign_config() {
        let config = ProviderConfig::GoogleCloud {
            project_id: "p".into(),
            access_token: "t".into(),
        };
        assert!(MemoryProviderFactory.create(&config).is_err());
        assert!(MemoryProviderFactory
            .create(&ProviderConfig::Memory { snapshot: None })
            .is_ok());
    }
}
