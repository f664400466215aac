//! Provider error classification
//!
//! The check-then-act window against a remote zone set cannot be closed, so
//! each race has a fixed answer instead of a retry. This module is that
//! answer: a decision table keyed by (operation, provider signal).
//!
//! Two remote calls are deliberately absent from [`Operation`]: the create
//! that follows a delete during a record overwrite, and the rollback create.
//! Any error from either one drives the overwrite procedure in
//! [`crate::reconcile::record`] rather than a table lookup.

use crate::error::ProviderError;
use crate::reconcile::Failure;

/// The remote call that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListZones,
    GetRecord,
    CreateRecord,
    DeleteRecord,
    CreateZone {
        /// Whether the caller asked for attribute verification
        require_extra: bool,
    },
    DeleteZone,
    ListRecords,
}

/// What the reconciler should do with a provider error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Expected not-found: treat the resource as absent
    Absent,
    /// Lost a race in a way that leaves the desired state in place; changed=false
    Tolerate,
    /// Stop the invocation
    Fatal(Failure),
}

/// Classify a provider error raised by `operation` on `subject`
///
/// `subject` is the record name or zone domain used in user-facing messages.
pub fn classify(operation: Operation, subject: &str, error: &ProviderError) -> Disposition {
    use Disposition::*;
    use ProviderError as E;

    match (operation, error) {
        (Operation::GetRecord, E::NotFound(_)) => Absent,
        (Operation::GetRecord, _) => Fatal(Failure::rejected(format!(
            "The record name is invalid: {}",
            subject
        ))),

        (Operation::CreateRecord, E::Invalid(_)) => Fatal(Failure::rejected(
            "The value is invalid for the given type",
        )),

        (Operation::CreateZone { require_extra: false }, E::AlreadyExists(_)) => Tolerate,
        (Operation::CreateZone { require_extra: true }, E::AlreadyExists(_)) => Fatal(
            Failure::conflict("The zone already exists, but params could not be verified"),
        ),
        (Operation::CreateZone { .. }, E::Invalid(_)) => Fatal(Failure::rejected(
            "The zone name, or a parameter, was invalid",
        )),
        (Operation::CreateZone { .. }, E::ReservedName(_)) => {
            Fatal(Failure::rejected("The zone name is reserved"))
        }

        (Operation::DeleteZone, E::NotFound(_)) => Tolerate,
        (Operation::DeleteZone, E::NotEmpty(_)) => Fatal(non_empty_zone(subject)),

        _ => Fatal(Failure::unexpected(error)),
    }
}

/// The failure for a zone that still holds user records
pub fn non_empty_zone(domain: &str) -> Failure {
    Failure::conflict(format!("Cannot remove non-empty zone: {}", domain))
}
