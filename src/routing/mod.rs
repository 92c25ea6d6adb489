//! Hostname-based entry point routing.
//!
//! # Data Flow
//! ```text
//! Session start:
//!     exposure config + export inventory (per service)
//!     → resolver.rs (alias table, collision checks)
//!     → table.rs (service labels, primary, addressing mode)
//!     → snapshot.rs (publish immutable table)
//!
//! Per request:
//!     Host header
//!     → router.rs (strip port/root, classify labels)
//!     → Entrypoint(service, export) | Default(service) | NotFound
//! ```
//!
//! # Design Decisions
//! - All validation happens at build time; routing never fails
//! - Tables are rebuilt wholesale, never patched
//! - No wildcard hosts, no regex

pub mod error;
pub mod exposure;
pub mod label;
pub mod resolver;
pub mod router;
pub mod snapshot;
pub mod table;

pub use error::ConfigError;
pub use exposure::{AliasSpec, ExportInventory, ExportKind, ExposureConfig};
pub use label::{Label, LocalRoot};
pub use resolver::{resolve, AliasTable};
pub use router::{route, RouteDecision};
pub use snapshot::Snapshot;
pub use table::{AddressingMode, RoutingTable, ServiceDefinition, ServiceRoutes};
