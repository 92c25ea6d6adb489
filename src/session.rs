//! Dev session state.
//!
//! A session pairs the routing table with the upstream address of every
//! service. Both are built together from one config and published together,
//! so a request never sees a table from one config and addresses from another.

use std::collections::HashMap;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::DevConfig;
use crate::routing::{ConfigError, ExposureConfig, LocalRoot, RoutingTable, Snapshot};

/// Errors raised while building a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Routing(#[from] ConfigError),

    #[error("service \"{service}\": invalid upstream address \"{address}\"")]
    Upstream { service: String, address: String },
}

/// Everything the request path needs for one session.
#[derive(Debug)]
pub struct Session {
    table: RoutingTable,
    upstreams: HashMap<String, SocketAddr>,
}

/// Published handle to the current session.
pub type SessionHandle = Snapshot<Session>;

impl Session {
    /// Build a session from a validated config.
    pub fn build(config: &DevConfig) -> Result<Self, SessionError> {
        let root = LocalRoot::parse(&config.listener.local_root)?;
        let definitions: Vec<_> = config.services.iter().map(|s| s.definition()).collect();
        let table = RoutingTable::build(root, &definitions)?;

        let mut upstreams = HashMap::with_capacity(config.services.len());
        for service in &config.services {
            let addr = service
                .address
                .parse::<SocketAddr>()
                .map_err(|_| SessionError::Upstream {
                    service: service.name.clone(),
                    address: service.address.clone(),
                })?;
            upstreams.insert(service.name.clone(), addr);

            if let ExposureConfig::Explicit(mapping) = &service.expose_entrypoints {
                if service.exports.is_empty() {
                    continue;
                }
                for export in mapping.keys().filter(|e| !service.exports.contains_key(*e)) {
                    tracing::warn!(
                        service = %service.name,
                        export = %export,
                        "Exposed entry point not found among the service's exports"
                    );
                }
            }
        }

        Ok(Self { table, upstreams })
    }

    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// Upstream address of the service named `service`.
    pub fn upstream(&self, service: &str) -> Option<SocketAddr> {
        self.upstreams.get(service).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::routing::RouteDecision;

    const CONFIG: &str = r#"
        [[services]]
        name = "worker-a"
        address = "127.0.0.1:9001"
        expose_entrypoints = true

        [services.exports]
        Greet = "named-entrypoint"
        default = "other"

        [[services]]
        name = "worker-b"
        address = "127.0.0.1:9002"

        [services.expose_entrypoints]
        Echo = true
    "#;

    #[test]
    fn test_build_session() {
        let config = parse_config(CONFIG).unwrap();
        let session = Session::build(&config).unwrap();

        assert_eq!(
            session.table().route("greet.worker-a.localhost"),
            RouteDecision::Entrypoint {
                service: "worker-a",
                entry_point: "Greet"
            }
        );
        assert_eq!(
            session.table().route("echo.worker-b.localhost"),
            RouteDecision::Entrypoint {
                service: "worker-b",
                entry_point: "Echo"
            }
        );
        assert_eq!(
            session.upstream("worker-b"),
            Some("127.0.0.1:9002".parse().unwrap())
        );
        assert_eq!(session.upstream("worker-c"), None);
    }

    #[test]
    fn test_explicit_export_missing_from_inventory_still_routes() {
        let config = parse_config(
            r#"
            [[services]]
            name = "worker-a"
            address = "127.0.0.1:9001"

            [services.expose_entrypoints]
            Greet = true
            Ghost = "spooky"

            [services.exports]
            Greet = "named-entrypoint"
            "#,
        )
        .unwrap();
        let session = Session::build(&config).unwrap();

        assert_eq!(
            session.table().route("greet.localhost"),
            RouteDecision::Entrypoint {
                service: "worker-a",
                entry_point: "Greet"
            }
        );
        assert_eq!(
            session.table().route("spooky.localhost"),
            RouteDecision::Entrypoint {
                service: "worker-a",
                entry_point: "Ghost"
            }
        );
    }

    #[test]
    fn test_routing_errors_surface() {
        let mut config = parse_config(CONFIG).unwrap();
        config.services[1].primary = true;
        config.services[0].primary = true;
        let err = Session::build(&config).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Routing(ConfigError::AmbiguousPrimary { .. })
        ));
    }

    #[test]
    fn test_invalid_local_root() {
        let mut config = parse_config(CONFIG).unwrap();
        config.listener.local_root = "-bad".into();
        assert!(matches!(
            Session::build(&config),
            Err(SessionError::Routing(ConfigError::InvalidLabel { .. }))
        ));
    }

    #[test]
    fn test_handle_swaps_whole_session() {
        let config = parse_config(CONFIG).unwrap();
        let handle = SessionHandle::new(Session::build(&config).unwrap());
        assert!(matches!(
            handle.load().table().route("echo.worker-b.localhost"),
            RouteDecision::Entrypoint { .. }
        ));

        let mut next = config.clone();
        next.services.truncate(1);
        handle.publish(Session::build(&next).unwrap());

        let current = handle.load_full();
        assert_eq!(
            current.table().route("echo.worker-b.localhost"),
            RouteDecision::NotFound
        );
        assert_eq!(
            current.table().route("greet.localhost"),
            RouteDecision::Entrypoint {
                service: "worker-a",
                entry_point: "Greet"
            }
        );
    }
}
