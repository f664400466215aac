//! Result records
//!
//! A report echoes every input field verbatim, then adds `changed`, `failed`
//! and, on failure, `msg` and `failure`. A failed report can still say
//! `changed: true`; that combination means data was lost.

use serde::Serialize;

use crate::config::{RecordRequest, ZoneRequest};
use crate::reconcile::{Failure, FailureKind, Reconciliation};

/// Fields shared by every report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub changed: bool,
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    pub dry_run: bool,
}

impl Outcome {
    pub fn new(result: &Reconciliation, dry_run: bool) -> Self {
        match result {
            Ok(changed) => Self {
                changed: *changed,
                failed: false,
                msg: None,
                failure: None,
                dry_run,
            },
            Err(Failure {
                kind,
                message,
                changed,
            }) => Self {
                changed: *changed,
                failed: true,
                msg: Some(message.clone()),
                failure: Some(*kind),
                dry_run,
            },
        }
    }
}

/// Result of a record reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordReport {
    #[serde(flatten)]
    pub request: RecordRequest,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl RecordReport {
    pub fn new(request: RecordRequest, result: &Reconciliation, dry_run: bool) -> Self {
        Self {
            request,
            outcome: Outcome::new(result, dry_run),
        }
    }

    pub fn changed(&self) -> bool {
        self.outcome.changed
    }

    pub fn failed(&self) -> bool {
        self.outcome.failed
    }
}

/// Result of a zone reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneReport {
    #[serde(flatten)]
    pub request: ZoneRequest,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ZoneReport {
    pub fn new(request: ZoneRequest, result: &Reconciliation, dry_run: bool) -> Self {
        Self {
            request,
            outcome: Outcome::new(result, dry_run),
        }
    }

    pub fn changed(&self) -> bool {
        self.outcome.changed
    }

    pub fn failed(&self) -> bool {
        self.outcome.failed
    }
}
