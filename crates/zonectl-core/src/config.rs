//! Configuration and request types
//!
//! Everything a reconciliation needs arrives as an immutable value:
//! [`EngineConfig`] for run-wide switches, [`ProviderConfig`] for the backend,
//! and one [`RecordRequest`] or [`ZoneRequest`] per invocation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{
    DEFAULT_TTL, DesiredRecord, DesiredState, DesiredZone, RecordData, RecordKey, ZoneAttributes,
};
use crate::name::Fqdn;

/// Engine settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Decide everything, mutate nothing
    #[serde(default)]
    pub dry_run: bool,
}

impl EngineConfig {
    /// Live mode: mutations are applied
    pub fn live() -> Self {
        Self { dry_run: false }
    }

    /// Dry-run mode: report the would-be outcome without mutating calls
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Google Cloud DNS
    GoogleCloud {
        /// Project that owns the managed zones
        project_id: String,
        /// OAuth2 bearer token with the `ndev.clouddns.readwrite` scope
        access_token: String,
    },

    /// In-memory provider, optionally seeded from a snapshot file
    Memory {
        /// Path to a JSON snapshot
        #[serde(default)]
        snapshot: Option<String>,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Load a provider configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: ProviderConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<()> {
        match self {
            ProviderConfig::GoogleCloud {
                project_id,
                access_token,
            } => {
                if project_id.trim().is_empty() {
                    return Err(Error::config("Google Cloud project ID cannot be empty"));
                }
                if access_token.is_empty() {
                    return Err(Error::config("Google Cloud access token cannot be empty"));
                }
                Ok(())
            }
            ProviderConfig::Memory { snapshot } => {
                if snapshot.as_ref().is_some_and(|p| p.is_empty()) {
                    return Err(Error::config("Memory provider snapshot path cannot be empty"));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(Error::config("Custom provider factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(Error::config("Custom provider config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::GoogleCloud { .. } => "google_cloud",
            ProviderConfig::Memory { .. } => "memory",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

// Keeps the access token out of logs
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::GoogleCloud { project_id, .. } => f
                .debug_struct("GoogleCloud")
                .field("project_id", project_id)
                .field("access_token", &"<REDACTED>")
                .finish(),
            ProviderConfig::Memory { snapshot } => f
                .debug_struct("Memory")
                .field("snapshot", snapshot)
                .finish(),
            ProviderConfig::Custom { factory, .. } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .finish_non_exhaustive(),
        }
    }
}

/// One record reconciliation request
///
/// Field values are kept exactly as given so they can be echoed back in the
/// report; [`RecordRequest::validate`] produces the normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRequest {
    #[serde(default)]
    pub state: DesiredState,

    /// Fully-qualified record name
    #[serde(alias = "name")]
    pub record: String,

    /// Domain of the zone holding the record
    pub zone: String,

    /// Record type (`A`, `MX`, `CNAME`, ...)
    #[serde(rename = "type")]
    pub record_type: String,

    /// Record values; may be empty when removing with `overwrite`
    #[serde(default)]
    pub values: Vec<String>,

    /// TTL in seconds; signed so a negative input can be reported rather than mangled
    #[serde(default = "default_ttl")]
    pub ttl: i64,

    #[serde(default)]
    pub overwrite: bool,
}

impl RecordRequest {
    /// Create a request for a present record with default TTL and no values
    pub fn new(
        record: impl Into<String>,
        zone: impl Into<String>,
        record_type: impl Into<String>,
    ) -> Self {
        Self {
            state: DesiredState::Present,
            record: record.into(),
            zone: zone.into(),
            record_type: record_type.into(),
            values: Vec::new(),
            ttl: default_ttl(),
            overwrite: false,
        }
    }

    pub fn with_state(mut self, state: DesiredState) -> Self {
        self.state = state;
        self
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ttl(mut self, ttl: i64) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Normalize names and check the TTL
    ///
    /// Record type support is provider-specific and checked by the engine.
    ///
    /// # Returns
    ///
    /// The normalized zone domain and the declared record
    pub fn validate(&self) -> Result<(Fqdn, DesiredRecord)> {
        if self.record_type.trim().is_empty() {
            return Err(Error::validation("Record type cannot be empty"));
        }

        if self.ttl < 0 {
            return Err(Error::validation("TTL cannot be less than zero"));
        }
        let ttl = u32::try_from(self.ttl)
            .map_err(|_| Error::validation(format!("TTL is too large: {}", self.ttl)))?;

        let zone = Fqdn::new(&self.zone)?;
        let name = Fqdn::new(&self.record)?;

        Ok((
            zone,
            DesiredRecord {
                state: self.state,
                key: RecordKey::new(self.record_type.clone(), name),
                data: RecordData::new(ttl, self.values.clone()),
                overwrite: self.overwrite,
            },
        ))
    }
}

/// One zone reconciliation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRequest {
    #[serde(default)]
    pub state: DesiredState,

    /// Zone domain
    pub zone: String,

    /// Description set when the zone is created
    #[serde(default)]
    pub description: String,

    /// Fail when an existing zone's attributes differ
    #[serde(default)]
    pub require_extra: bool,
}

impl ZoneRequest {
    /// Create a request for a present zone with an empty description
    pub fn new(zone: impl Into<String>) -> Self {
        Self {
            state: DesiredState::Present,
            zone: zone.into(),
            description: String::new(),
            require_extra: false,
        }
    }

    pub fn with_state(mut self, state: DesiredState) -> Self {
        self.state = state;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_require_extra(mut self, require_extra: bool) -> Self {
        self.require_extra = require_extra;
        self
    }

    /// Normalize the domain
    pub fn validate(&self) -> Result<DesiredZone> {
        Ok(DesiredZone {
            state: self.state,
            domain: Fqdn::new(&self.zone)?,
            attributes: ZoneAttributes {
                description: self.description.clone(),
            },
            require_extra: self.require_extra,
        })
    }
}

fn default_ttl() -> i64 {
    i64::from(DEFAULT_TTL)
}
