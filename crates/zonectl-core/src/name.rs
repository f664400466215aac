// # Domain Names
//
// Zone domains and record names are always held in fully-qualified form, with
// the trailing dot present. `Fqdn::new` is the only way in, so a name lacking
// the dot is normalized before it can reach a comparison or a provider call.
//
// Validation follows RFC 1035 limits loosely. Underscores and a leading `*`
// label are accepted because SRV/TXT owner names and wildcards need them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Maximum length of a domain name, excluding the trailing dot
const MAX_NAME_LEN: usize = 253;

/// Maximum length of a single label
const MAX_LABEL_LEN: usize = 63;

/// A fully-qualified, trailing-dot-normalized domain name
///
/// Case is preserved and comparison is case-sensitive: `FOO.com` and
/// `foo.com` are different names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fqdn(String);

impl Fqdn {
    /// Validate and normalize a domain name
    ///
    /// `"foo.com"` and `"foo.com."` both produce `foo.com.`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for empty names, empty labels, over-long
    /// names or labels, and labels with characters outside `[A-Za-z0-9-_*]`.
    pub fn new(name: &str) -> Result<Self> {
        let trimmed = name.trim();
        let bare = trimmed.strip_suffix('.').unwrap_or(trimmed);

        if bare.is_empty() {
            return Err(Error::validation(format!(
                "Domain name cannot be empty: '{}'",
                name
            )));
        }

        if bare.len() > MAX_NAME_LEN {
            return Err(Error::validation(format!(
                "Domain name too long: {} chars (max {}). Got: {}",
                bare.len(),
                MAX_NAME_LEN,
                name
            )));
        }

        for (index, label) in bare.split('.').enumerate() {
            validate_label(label, index, name)?;
        }

        Ok(Self(format!("{}.", bare)))
    }

    /// The name with its trailing dot
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name without its trailing dot
    pub fn trimmed(&self) -> &str {
        &self.0[..self.0.len() - 1]
    }

    /// Whether `self` is `zone` or a name below it
    pub fn is_within(&self, zone: &Fqdn) -> bool {
        if self == zone {
            return true;
        }
        self.0.len() > zone.0.len()
            && self.0.ends_with(zone.as_str())
            && self.0.as_bytes()[self.0.len() - zone.0.len() - 1] == b'.'
    }
}

fn validate_label(label: &str, index: usize, name: &str) -> Result<()> {
    if label.is_empty() {
        return Err(Error::validation(format!(
            "Domain name has empty label: '{}'",
            name
        )));
    }

    if label.len() > MAX_LABEL_LEN {
        return Err(Error::validation(format!(
            "Domain label too long: {} chars (max {}). Label: '{}'",
            label.len(),
            MAX_LABEL_LEN,
            label
        )));
    }

    if index == 0 && label == "*" {
        return Ok(());
    }

    if !label
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::validation(format!(
            "Domain label contains invalid characters. Label: '{}'",
            label
        )));
    }

    if label.starts_with('-') || label.ends_with('-') {
        return Err(Error::validation(format!(
            "Domain label cannot start or end with hyphen. Label: '{}'",
            label
        )));
    }

    Ok(())
}

impl fmt::Display for Fqdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fqdn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Fqdn {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<Fqdn> for String {
    fn from(value: Fqdn) -> Self {
        value.0
    }
}

impl std::str::FromStr for Fqdn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_dot_is_normalized() {
        let bare = Fqdn::new("foo.com").unwrap();
        let dotted = Fqdn::new("foo.com.").unwrap();
        assert_eq!(bare, dotted);
        assert_eq!(bare.as_str(), "foo.com.");
        assert_eq!(bare.trimmed(), "foo.com");
    }

    #[test]
    fn case_is_preserved_and_significant() {
        let upper = Fqdn::new("FOO.com").unwrap();
        assert_eq!(upper.as_str(), "FOO.com.");
        assert_ne!(upper, Fqdn::new("foo.com").unwrap());
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(Fqdn::new("  www.foo.com ").unwrap().as_str(), "www.foo.com.");
    }

    #[test]
    fn empty_and_root_names_are_rejected() {
        assert!(matches!(Fqdn::new(""), Err(Error::Validation(_))));
        assert!(matches!(Fqdn::new("."), Err(Error::Validation(_))));
        assert!(matches!(Fqdn::new("   "), Err(Error::Validation(_))));
    }

    #[test]
    fn malformed_names_are_rejected() {
        assert!(Fqdn::new("foo..com").is_err());
        assert!(Fqdn::new("-foo.com").is_err());
        assert!(Fqdn::new("foo bar.com").is_err());
        assert!(Fqdn::new(&format!("{}.com", "a".repeat(64))).is_err());
        assert!(Fqdn::new(&"a.".repeat(130)).is_err());
    }

    #[test]
    fn service_and_wildcard_names_are_accepted() {
        assert!(Fqdn::new("_sip._tcp.foo.com").is_ok());
        assert!(Fqdn::new("*.foo.com").is_ok());
        assert!(Fqdn::new("www.*.foo.com").is_err());
    }

    #[test]
    fn containment() {
        let zone = Fqdn::new("foo.com").unwrap();
        assert!(Fqdn::new("foo.com.").unwrap().is_within(&zone));
        assert!(Fqdn::new("www.foo.com").unwrap().is_within(&zone));
        assert!(!Fqdn::new("barfoo.com").unwrap().is_within(&zone));
        assert!(!Fqdn::new("foo.org").unwrap().is_within(&zone));
    }

    #[test]
    fn serde_normalizes_on_the_way_in() {
        let name: Fqdn = serde_json::from_str("\"foo.com\"").unwrap();
        assert_eq!(name.as_str(), "foo.com.");
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"foo.com.\"");
        assert!(serde_json::from_str::<Fqdn>("\"\"").is_err());
    }
}
