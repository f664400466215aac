//! Zone and record lookups
//!
//! Absence is an expected outcome here and comes back as `None`. Only
//! provider failures that are not "does not exist" become errors.

use tracing::debug;

use crate::classify::{Disposition, Operation, classify};
use crate::model::{Record, RecordKey, Zone};
use crate::name::Fqdn;
use crate::reconcile::Failure;
use crate::traits::DnsProvider;

/// Find the zone whose domain is exactly `domain`
///
/// Providers offer no index from domain to zone id, so this scans the full
/// listing and returns the first match.
pub async fn find_zone(
    provider: &dyn DnsProvider,
    domain: &Fqdn,
) -> Result<Option<Zone>, Failure> {
    debug!("Looking up zone {}", domain);

    let zones = provider.list_zones().await.map_err(|e| {
        match classify(Operation::ListZones, domain.as_str(), &e) {
            Disposition::Fatal(failure) => failure,
            _ => Failure::unexpected(&e),
        }
    })?;

    let found = zones.into_iter().find(|zone| &zone.domain == domain);
    match &found {
        Some(zone) => debug!("Found zone {} (id: {})", domain, zone.id),
        None => debug!("Zone {} not found", domain),
    }
    Ok(found)
}

/// Fetch the record identified by `key` within `zone`
pub async fn find_record(
    provider: &dyn DnsProvider,
    zone: &Zone,
    key: &RecordKey,
) -> Result<Option<Record>, Failure> {
    let identity = key.identity();
    debug!("Looking up record {} in zone {}", identity, zone.id);

    match provider.get_record(&zone.id, &identity).await {
        Ok(record) => {
            debug!(
                "Found record {} (ttl: {}, values: {:?})",
                identity, record.data.ttl, record.data.values
            );
            Ok(Some(record))
        }
        Err(e) => match classify(Operation::GetRecord, key.name.as_str(), &e) {
            Disposition::Absent => {
                debug!("Record {} not found", identity);
                Ok(None)
            }
            Disposition::Fatal(failure) => Err(failure),
            Disposition::Tolerate => Err(Failure::unexpected(&e)),
        },
    }
}
