// # Zone Reconciler
//
// Zone attributes are fixed at creation, so an existing zone is never
// mutated: it either satisfies the declaration or the run fails.
//
// Deletion is guarded. A zone always holds its NS and SOA records; anything
// beyond those two means user data, and the zone is left alone.

use tracing::{info, warn};

use crate::classify::{Disposition, Operation, classify, non_empty_zone};
use crate::config::EngineConfig;
use crate::model::{DesiredState, DesiredZone, SYSTEM_RECORD_COUNT, Zone};
use crate::reconcile::{Failure, Reconciliation};
use crate::traits::DnsProvider;

/// Converge one zone towards `desired`
///
/// `current` is the result of the zone lookup.
pub async fn reconcile_zone(
    provider: &dyn DnsProvider,
    desired: &DesiredZone,
    current: Option<&Zone>,
    config: &EngineConfig,
) -> Reconciliation {
    match desired.state {
        DesiredState::Present => ensure_present(provider, desired, current, config).await,
        DesiredState::Absent => ensure_absent(provider, desired, current, config).await,
    }
}

async fn ensure_present(
    provider: &dyn DnsProvider,
    desired: &DesiredZone,
    current: Option<&Zone>,
    config: &EngineConfig,
) -> Reconciliation {
    let domain = desired.domain.as_str();

    if let Some(zone) = current {
        if desired.require_extra && zone.attributes != desired.attributes {
            warn!(
                "Zone {} description is {:?}, declared {:?}",
                domain, zone.attributes.description, desired.attributes.description
            );
            return Err(Failure::conflict(
                "Existing zone description differs and cannot be updated",
            ));
        }
        info!("Zone {} already exists (id: {})", domain, zone.id);
        return Ok(false);
    }

    if config.dry_run {
        info!("[DRY-RUN] Would create zone {}", domain);
        return Ok(true);
    }

    info!("Creating zone {}", domain);
    match provider.create_zone(&desired.domain, &desired.attributes).await {
        Ok(zone) => {
            info!("Zone {} created (id: {})", domain, zone.id);
            Ok(true)
        }
        Err(e) => {
            let op = Operation::CreateZone {
                require_extra: desired.require_extra,
            };
            match classify(op, domain, &e) {
                Disposition::Tolerate => {
                    warn!("Zone {} was created concurrently by someone else", domain);
                    Ok(false)
                }
                Disposition::Fatal(failure) => Err(failure),
                Disposition::Absent => Err(Failure::unexpected(&e)),
            }
        }
    }
}

async fn ensure_absent(
    provider: &dyn DnsProvider,
    desired: &DesiredZone,
    current: Option<&Zone>,
    config: &EngineConfig,
) -> Reconciliation {
    let domain = desired.domain.as_str();

    let Some(zone) = current else {
        info!("Zone {} already absent", domain);
        return Ok(false);
    };

    let records = provider.list_records(zone).await.map_err(|e| {
        match classify(Operation::ListRecords, domain, &e) {
            Disposition::Fatal(failure) => failure,
            _ => Failure::unexpected(&e),
        }
    })?;

    if records.len() > SYSTEM_RECORD_COUNT {
        warn!(
            "Zone {} holds {} records, refusing to delete",
            domain,
            records.len()
        );
        return Err(non_empty_zone(domain));
    }

    if config.dry_run {
        info!("[DRY-RUN] Would delete zone {}", domain);
        return Ok(true);
    }

    info!("Deleting zone {} (id: {})", domain, zone.id);
    match provider.delete_zone(zone).await {
        Ok(()) => Ok(true),
        Err(e) => match classify(Operation::DeleteZone, domain, &e) {
            Disposition::Tolerate => {
                warn!("Zone {} was deleted concurrently by someone else", domain);
                Ok(false)
            }
            Disposition::Fatal(failure) => Err(failure),
            Disposition::Absent => Err(Failure::unexpected(&e)),
        },
    }
}
