//! Data model shared by lookups, reconcilers and providers

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::name::Fqdn;

/// Number of system-managed records (NS and SOA) every zone carries
pub const SYSTEM_RECORD_COUNT: usize = 2;

/// Record types a zone carries on its own and that zonectl never creates or removes
pub const SYSTEM_RECORD_TYPES: [&str; 2] = ["NS", "SOA"];

/// Default TTL for records, in seconds
pub const DEFAULT_TTL: u32 = 300;

/// Whether the declared resource should exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    /// The resource must exist with the declared attributes
    #[default]
    Present,
    /// The resource must not exist
    Absent,
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesiredState::Present => f.write_str("present"),
            DesiredState::Absent => f.write_str("absent"),
        }
    }
}

impl std::str::FromStr for DesiredState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "present" => Ok(DesiredState::Present),
            "absent" => Ok(DesiredState::Absent),
            other => Err(Error::validation(format!("Unknown state : {}", other))),
        }
    }
}

/// Extra zone attributes, fixed at creation time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneAttributes {
    /// Free-text description
    #[serde(default)]
    pub description: String,
}

/// A zone as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Provider-assigned handle; not derivable from the domain in general
    pub id: String,
    /// The zone apex
    pub domain: Fqdn,
    /// Attributes set at creation
    #[serde(default)]
    pub attributes: ZoneAttributes,
}

/// Identity of a record within a zone: type plus owner name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    /// Record type as the provider spells it (`A`, `MX`, ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Owner name
    pub name: Fqdn,
}

impl RecordKey {
    pub fn new(record_type: impl Into<String>, name: Fqdn) -> Self {
        Self {
            record_type: record_type.into(),
            name,
        }
    }

    /// The lookup key `"<type>:<name>"`, e.g. `A:www.example.com.`
    pub fn identity(&self) -> String {
        format!("{}:{}", self.record_type, self.name)
    }

    /// Split an identity key back into its parts
    pub fn parse_identity(identity: &str) -> Result<Self> {
        let (record_type, name) = identity.split_once(':').ok_or_else(|| {
            Error::validation(format!("Malformed record identity: '{}'", identity))
        })?;
        if record_type.is_empty() {
            return Err(Error::validation(format!(
                "Malformed record identity: '{}'",
                identity
            )));
        }
        Ok(Self::new(record_type, Fqdn::new(name)?))
    }

    /// Whether this is an NS or SOA record
    pub fn is_system_type(&self) -> bool {
        SYSTEM_RECORD_TYPES.contains(&self.record_type.as_str())
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.record_type, self.name)
    }
}

/// The mutable part of a record
///
/// Equality is exact: TTLs compare as integers and values compare as an
/// ordered sequence, so reordered values are a difference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordData {
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Record values, in order
    pub values: Vec<String>,
}

impl RecordData {
    pub fn new(ttl: u32, values: Vec<String>) -> Self {
        Self { ttl, values }
    }
}

/// A record as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Id of the owning zone (lookup back-reference only)
    pub zone_id: String,
    /// Type and owner name
    #[serde(flatten)]
    pub key: RecordKey,
    /// TTL and values
    #[serde(flatten)]
    pub data: RecordData,
}

/// Declared state for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredRecord {
    pub state: DesiredState,
    pub key: RecordKey,
    pub data: RecordData,
    /// Permit destructive replacement/removal of a differing record
    pub overwrite: bool,
}

/// Declared state for one zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredZone {
    pub state: DesiredState,
    pub domain: Fqdn,
    pub attributes: ZoneAttributes,
    /// Treat attribute drift on an existing zone as a failure
    pub require_extra: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_concatenates_type_and_name() {
        let key = RecordKey::new("A", Fqdn::new("www.example.com").unwrap());
        assert_eq!(key.identity(), "A:www.example.com.");
        assert_eq!(RecordKey::parse_identity(&key.identity()).unwrap(), key);
    }

    #[test]
    fn identity_parse_rejects_garbage() {
        assert!(RecordKey::parse_identity("www.example.com.").is_err());
        assert!(RecordKey::parse_identity(":www.example.com.").is_err());
        assert!(RecordKey::parse_identity("A:").is_err());
    }

    #[test]
    fn value_order_is_significant() {
        let a = RecordData::new(300, vec!["1.1.1.1".into(), "2.2.2.2".into()]);
        let b = RecordData::new(300, vec!["2.2.2.2".into(), "1.1.1.1".into()]);
        assert_ne!(a, b);
        assert_ne!(a, RecordData::new(301, a.values.clone()));
    }

    #[test]
    fn desired_state_parsing() {
        assert_eq!("present".parse::<DesiredState>().unwrap(), DesiredState::Present);
        assert_eq!("absent".parse::<DesiredState>().unwrap(), DesiredState::Absent);
        assert!("gone".parse::<DesiredState>().is_err());
        assert_eq!(DesiredState::default(), DesiredState::Present);
    }

    #[test]
    fn record_serializes_flat() {
        let record = Record {
            zone_id: "example-com".into(),
            key: RecordKey::new("MX", Fqdn::new("example.com").unwrap()),
            data: RecordData::new(3600, vec!["10 mail.example.com.".into()]),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "MX");
        assert_eq!(json["name"], "example.com.");
        assert_eq!(json["ttl"], 3600);
    }
}
