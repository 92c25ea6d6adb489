//! Local development proxy with hostname-based entry point routing.
//!
//! Several service processes run side by side; each named entry point of each
//! service is reachable as its own virtual host under a local root:
//!
//! ```text
//! localhost                   → primary service, default export
//! greet.localhost             → the only exposing service, entry point `Greet`
//! greet.worker-a.localhost    → service `worker-a`, entry point `Greet`
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod session;

pub use config::DevConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{route, RouteDecision, RoutingTable};
pub use session::{Session, SessionHandle};
