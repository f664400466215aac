//! Reconciliation engine
//!
//! The Engine is responsible for:
//! - Validating a request before any provider call
//! - Resolving the zone (and, for records, the record)
//! - Handing both to the matching reconciler
//! - Turning the outcome into a report that echoes the request
//!
//! ## Flow
//!
//! ```text
//! RecordRequest ─ validate ─ find_zone ─ find_record ─ reconcile_record ─┐
//!                                                                        ├─ Report
//! ZoneRequest ─── validate ─ find_zone ─────────────── reconcile_zone ───┘
//! ```
//!
//! One call reconciles exactly one record or one zone. Calls are strictly
//! sequential, nothing is retried, and the engine holds no state between
//! calls: every invocation looks the zone and record up fresh.

use tracing::{error, info, warn};

use crate::config::{EngineConfig, RecordRequest, ZoneRequest};
use crate::lookup::{find_record, find_zone};
use crate::reconcile::{Failure, Reconciliation, reconcile_record, reconcile_zone};
use crate::report::{RecordReport, ZoneReport};
use crate::traits::DnsProvider;

/// Core reconciliation engine
///
/// ## Lifecycle
///
/// 1. Create with [`Engine::new()`]
/// 2. Call [`Engine::reconcile_record()`] or [`Engine::reconcile_zone()`]
/// 3. Drop
///
/// Configuration is fixed at construction; there is no process-wide state.
pub struct Engine {
    /// DNS provider for lookups and mutations
    provider: Box<dyn DnsProvider>,

    /// Run-wide settings
    config: EngineConfig,
}

impl Engine {
    /// Create a new engine
    pub fn new(provider: Box<dyn DnsProvider>, config: EngineConfig) -> Self {
        Self { provider, config }
    }

    /// The provider this engine talks to
    pub fn provider(&self) -> &dyn DnsProvider {
        self.provider.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reconcile one record and report the outcome
    pub async fn reconcile_record(&self, request: &RecordRequest) -> RecordReport {
        info!(
            "Reconciling record {} {} in zone {} (state: {}, overwrite: {}) [mode: {}]",
            request.record_type,
            request.record,
            request.zone,
            request.state,
            request.overwrite,
            self.mode()
        );

        let result = self.run_record(request).await;
        self.log_result(&request.record, &result);
        RecordReport::new(request.clone(), &result, self.config.dry_run)
    }

    /// Reconcile one zone and report the outcome
    pub async fn reconcile_zone(&self, request: &ZoneRequest) -> ZoneReport {
        info!(
            "Reconciling zone {} (state: {}, require_extra: {}) [mode: {}]",
            request.zone,
            request.state,
            request.require_extra,
            self.mode()
        );

        let result = self.run_zone(request).await;
        self.log_result(&request.zone, &result);
        ZoneReport::new(request.clone(), &result, self.config.dry_run)
    }

    async fn run_record(&self, request: &RecordRequest) -> Reconciliation {
        if !self
            .provider
            .supported_record_types()
            .contains(&request.record_type.as_str())
        {
            return Err(Failure::validation("Record type is not supported"));
        }

        let (zone_name, desired) = request.validate()?;

        if !desired.key.name.is_within(&zone_name) {
            warn!("Record {} is not below zone {}", desired.key.name, zone_name);
        }

        let zone = find_zone(self.provider(), &zone_name)
            .await?
            .ok_or_else(|| Failure::missing_zone(format!("The zone was not found: {}", zone_name)))?;

        let current = find_record(self.provider(), &zone, &desired.key).await?;

        reconcile_record(
            self.provider(),
            &zone,
            &desired,
            current.as_ref(),
            &self.config,
        )
        .await
    }

    async fn run_zone(&self, request: &ZoneRequest) -> Reconciliation {
        let desired = request.validate()?;
        let current = find_zone(self.provider(), &desired.domain).await?;
        reconcile_zone(self.provider(), &desired, current.as_ref(), &self.config).await
    }

    fn mode(&self) -> &'static str {
        if self.config.dry_run { "DRY-RUN" } else { "LIVE" }
    }

    fn log_result(&self, subject: &str, result: &Reconciliation) {
        match result {
            Ok(true) => info!("{}: changed", subject),
            Ok(false) => info!("{}: unchanged", subject),
            Err(failure) if failure.changed => {
                error!("{}: failed after mutating: {}", subject, failure)
            }
            Err(failure) => error!("{}: failed: {}", subject, failure),
        }
    }
}
