// # Record Reconciler
//
// ## Decision Flow
//
// ```text
// present, no record           -> create                          changed
// present, record equal        -> nothing                         unchanged
// present, differs, !overwrite -> fail (protection)               unchanged
// present, differs, overwrite  -> delete, create [-> rollback]    see ReplaceOutcome
// absent,  no record           -> nothing                         unchanged
// absent,  differs, !overwrite -> fail (protection)               unchanged
// absent,  otherwise           -> delete                          changed
// ```
//
// Providers cannot update a record in place, so a replacement is a delete
// followed by a create. That pair is not atomic. If the create fails, the
// original record is recreated from the copy taken at lookup time; the
// rollback bounds the damage of the window but does not remove it.
//
// Dry-run returns right after the decision, before the first mutating call.

use tracing::{error, info, warn};

use crate::classify::{Disposition, Operation, classify};
use crate::config::EngineConfig;
use crate::error::ProviderError;
use crate::model::{DesiredRecord, DesiredState, Record, Zone};
use crate::reconcile::{Failure, Reconciliation};
use crate::traits::DnsProvider;

const OVERWRITE_PROTECTED: &str =
    "This record already exists, and overwrite protection is enabled";
const REMOVE_PROTECTED: &str =
    "Overwrite protection is enabled, and the given values do not match the existing values";
const OVERWRITE_ROLLED_BACK: &str = "The attempt to overwrite the record failed due to an error, and the existing record was restored.";
const OVERWRITE_DATA_LOST: &str =
    "The attempt to overwrite the record failed due to an error, and the existing record was lost.";

/// Terminal state of a delete-then-create replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// The new record is in place
    Replaced,
    /// Creating the new record failed; the original was recreated
    RolledBack {
        /// Why the new record could not be created
        cause: ProviderError,
    },
    /// Creating the new record failed and so did recreating the original
    DataLost {
        /// Why the new record could not be created
        cause: ProviderError,
        /// Why the original could not be recreated
        rollback_error: ProviderError,
    },
}

impl ReplaceOutcome {
    /// Map the terminal state onto the reconciliation result
    pub fn into_reconciliation(self) -> Reconciliation {
        match self {
            ReplaceOutcome::Replaced => Ok(true),
            ReplaceOutcome::RolledBack { .. } => Err(Failure::rolled_back(OVERWRITE_ROLLED_BACK)),
            ReplaceOutcome::DataLost { .. } => Err(Failure::data_lost(OVERWRITE_DATA_LOST)),
        }
    }
}

/// Converge one record in `zone` towards `desired`
///
/// `current` is the result of the record lookup.
pub async fn reconcile_record(
    provider: &dyn DnsProvider,
    zone: &Zone,
    desired: &DesiredRecord,
    current: Option<&Record>,
    config: &EngineConfig,
) -> Reconciliation {
    match desired.state {
        DesiredState::Present => ensure_present(provider, zone, desired, current, config).await,
        DesiredState::Absent => ensure_absent(provider, desired, current, config).await,
    }
}

async fn ensure_present(
    provider: &dyn DnsProvider,
    zone: &Zone,
    desired: &DesiredRecord,
    current: Option<&Record>,
    config: &EngineConfig,
) -> Reconciliation {
    let identity = desired.key.identity();

    let Some(current) = current else {
        if config.dry_run {
            info!("[DRY-RUN] Would create record {} -> {:?}", identity, desired.data.values);
            return Ok(true);
        }

        info!("Creating record {} -> {:?}", identity, desired.data.values);
        return match provider.create_record(zone, &desired.key, &desired.data).await {
            Ok(_) => Ok(true),
            Err(e) => Err(into_failure(
                classify(Operation::CreateRecord, desired.key.name.as_str(), &e),
                &e,
            )),
        };
    };

    if current.data == desired.data {
        info!("Record {} already matches, nothing to do", identity);
        return Ok(false);
    }

    if !desired.overwrite {
        warn!(
            "Record {} differs (current: ttl={} {:?}) and overwrite is disabled",
            identity, current.data.ttl, current.data.values
        );
        return Err(Failure::conflict(OVERWRITE_PROTECTED));
    }

    if config.dry_run {
        info!(
            "[DRY-RUN] Would replace record {}: {:?} -> {:?}",
            identity, current.data.values, desired.data.values
        );
        return Ok(true);
    }

    replace_record(provider, zone, current, desired)
        .await?
        .into_reconciliation()
}

/// Replace `current` with `desired` by delete, create, and rollback on failure
///
/// # Returns
///
/// - `Err(Failure)`: The delete failed; nothing was mutated
/// - `Ok(ReplaceOutcome)`: The delete succeeded; one of the three terminal states
pub async fn replace_record(
    provider: &dyn DnsProvider,
    zone: &Zone,
    current: &Record,
    desired: &DesiredRecord,
) -> Result<ReplaceOutcome, Failure> {
    let identity = desired.key.identity();

    info!(
        "Replacing record {}: {:?} -> {:?}",
        identity, current.data.values, desired.data.values
    );

    if let Err(e) = provider.delete_record(current).await {
        return Err(into_failure(
            classify(Operation::DeleteRecord, current.key.name.as_str(), &e),
            &e,
        ));
    }

    let cause = match provider.create_record(zone, &desired.key, &desired.data).await {
        Ok(_) => {
            info!("Record {} replaced", identity);
            return Ok(ReplaceOutcome::Replaced);
        }
        Err(cause) => cause,
    };

    warn!(
        "Creating replacement for {} failed ({}), restoring the original record",
        identity, cause
    );

    match provider.create_record(zone, &current.key, &current.data).await {
        Ok(_) => {
            warn!("Original record {} restored", identity);
            Ok(ReplaceOutcome::RolledBack { cause })
        }
        Err(rollback_error) => {
            error!(
                "Restoring {} failed ({}); the original record (ttl={} {:?}) is lost",
                identity, rollback_error, current.data.ttl, current.data.values
            );
            Ok(ReplaceOutcome::DataLost {
                cause,
                rollback_error,
            })
        }
    }
}

async fn ensure_absent(
    provider: &dyn DnsProvider,
    desired: &DesiredRecord,
    current: Option<&Record>,
    config: &EngineConfig,
) -> Reconciliation {
    let identity = desired.key.identity();

    let Some(current) = current else {
        info!("Record {} already absent", identity);
        return Ok(false);
    };

    if !desired.overwrite && current.data != desired.data {
        warn!(
            "Record {} does not match the declared values (current: ttl={} {:?})",
            identity, current.data.ttl, current.data.values
        );
        return Err(Failure::conflict(REMOVE_PROTECTED));
    }

    if config.dry_run {
        info!("[DRY-RUN] Would delete record {}", identity);
        return Ok(true);
    }

    info!("Deleting record {}", identity);
    provider.delete_record(current).await.map_err(|e| {
        into_failure(
            classify(Operation::DeleteRecord, current.key.name.as_str(), &e),
            &e,
        )
    })?;

    Ok(true)
}

/// Record operations have no tolerated races; anything non-fatal is still a failure here
fn into_failure(disposition: Disposition, error: &ProviderError) -> Failure {
    match disposition {
        Disposition::Fatal(failure) => failure,
        Disposition::Absent | Disposition::Tolerate => Failure::unexpected(error),
    }
}
