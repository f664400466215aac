// # zonectl-core
//
// Reconciles a declared DNS zone or record against what a remote
// authoritative DNS service actually holds, applying the smallest mutation
// that converges the two while refusing to destroy data it was not told it
// may destroy.
//
// ## Architecture Overview
//
// - **DnsProvider**: Trait for the remote zone/record operations
// - **lookup**: Resolve a domain to a zone, a (type, name) pair to a record
// - **reconcile**: Record and zone reconcilers, including the
//   delete-then-recreate-with-rollback overwrite and the non-empty zone guard
// - **classify**: Decision table mapping (operation, provider error) to
//   absent / tolerate / fatal
// - **Engine**: Validates one request, runs lookups and the reconciler, reports
// - **ProviderRegistry**: Plugin-based registry for DNS providers
//
// ## Design Principles
//
// 1. **Provider-neutral**: Providers only translate wire errors; decisions live here
// 2. **No retries**: A failed call is either rolled back or surfaced
// 3. **Immutable configuration**: Dry-run and friends are values, not globals
// 4. **Honest results**: Every failure carries its own `changed` flag

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod memory;
pub mod model;
pub mod name;
pub mod reconcile;
pub mod registry;
pub mod report;
pub mod traits;

// Re-export core types for convenience
pub use config::{EngineConfig, ProviderConfig, RecordRequest, ZoneRequest};
pub use engine::Engine;
pub use error::{Error, ProviderError, Result};
pub use memory::MemoryProvider;
pub use model::{DesiredState, Record, RecordData, RecordKey, Zone, ZoneAttributes};
pub use name::Fqdn;
pub use reconcile::{Failure, FailureKind, ReplaceOutcome};
pub use registry::ProviderRegistry;
pub use report::{RecordReport, ZoneReport};
pub use traits::{DnsProvider, DnsProviderFactory};
