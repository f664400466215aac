//! Reconcilers for records and zones
//!
//! A reconciler takes the declared state, the current state (already looked
//! up, possibly absent) and a provider, and applies the smallest mutation that
//! converges the two. It returns `Ok(changed)` or a [`Failure`].
//!
//! Every fatal path carries its own `changed` flag. It is `false` everywhere
//! except [`FailureKind::DataLost`], where a record was deleted and could not
//! be put back.

pub mod record;
pub mod zone;

use serde::Serialize;
use thiserror::Error;

use crate::error::{Error, ProviderError};

pub use record::{ReplaceOutcome, reconcile_record};
pub use zone::reconcile_zone;

/// Outcome of a reconciliation: `Ok(changed)` or a fatal [`Failure`]
pub type Reconciliation = std::result::Result<bool, Failure>;

/// Category of a fatal reconciliation outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Input rejected before any provider call
    Validation,
    /// The zone a record belongs to does not exist
    MissingZone,
    /// Overwrite or attribute protection blocked the change
    Conflict,
    /// The provider refused the request for a semantic reason
    Rejected,
    /// A replacement failed and the original record was restored
    OverwriteRolledBack,
    /// A replacement failed and the original record could not be restored
    DataLost,
    /// Anything not classified above
    Unexpected,
}

/// A fatal reconciliation outcome
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    /// Whether provider state was mutated before the failure
    pub changed: bool,
}

impl Failure {
    fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            changed: false,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Validation, message)
    }

    pub fn missing_zone(message: impl Into<String>) -> Self {
        Self::new(FailureKind::MissingZone, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Conflict, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Rejected, message)
    }

    pub fn rolled_back(message: impl Into<String>) -> Self {
        Self::new(FailureKind::OverwriteRolledBack, message)
    }

    /// The one failure that reports `changed = true`
    pub fn data_lost(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::DataLost,
            message: message.into(),
            changed: true,
        }
    }

    /// Generic failure carrying a dump of the provider error
    pub fn unexpected(error: &ProviderError) -> Self {
        Self::new(
            FailureKind::Unexpected,
            format!("Unexpected response: {:?}", error),
        )
    }
}

impl From<Error> for Failure {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(message) => Failure::validation(message),
            Error::Provider(provider_err) => Failure::unexpected(&provider_err),
            other => Failure::new(FailureKind::Unexpected, other.to_string()),
        }
    }
}
