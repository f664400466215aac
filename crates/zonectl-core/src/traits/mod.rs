//! Core traits for zonectl
//!
//! - [`DnsProvider`]: Remote zone and record operations
//! - [`DnsProviderFactory`]: Build a provider from configuration

pub mod dns_provider;

pub use dns_provider::{DnsProvider, DnsProviderFactory};
