//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (route decisions, request latency)
//!
//! Consumers:
//!     → stdout (fmt subscriber)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields, not formatted strings, for host/decision/service
//! - Metrics are cheap (atomic increments)
//! - Metrics endpoint disabled by default in dev sessions

pub mod logging;
pub mod metrics;
