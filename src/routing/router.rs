//! Request-time host classification.
//!
//! # Responsibilities
//! - Normalize the Host header (case, port, trailing dot)
//! - Strip the local root
//! - Classify the remaining labels into a dispatch decision
//!
//! # Design Decisions
//! - Total and pure: every host string yields a decision, nothing panics
//! - Borrowed result: no allocation beyond the lowercase copy of the host
//! - One- and two-label semantics depend only on the table's addressing mode:
//!   one label routes only in single-service mode, two only in multi-service mode
//!
//! ```text
//! [entryAlias[.serviceLabel]].<localRoot>[:port]
//! ```

use serde::Serialize;

use crate::routing::table::{AddressingMode, RoutingTable};

/// Outcome of routing one host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RouteDecision<'a> {
    /// Dispatch to a named entry point of a service.
    Entrypoint {
        service: &'a str,
        entry_point: &'a str,
    },
    /// Dispatch to a service's default export.
    Default { service: &'a str },
    /// No routing rule applies.
    NotFound,
}

impl RouteDecision<'_> {
    /// Short tag used for logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            RouteDecision::Entrypoint { .. } => "entrypoint",
            RouteDecision::Default { .. } => "default",
            RouteDecision::NotFound => "not-found",
        }
    }
}

/// Remove a trailing `:port` when the suffix is all digits.
fn strip_port(host: &str) -> Option<&str> {
    match host.rsplit_once(':') {
        None => Some(host),
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            // A second colon means an IPv6 literal or garbage.
            (!name.contains(':')).then_some(name)
        }
        Some(_) => None,
    }
}

impl RoutingTable {
    /// Classify `host` (a Host header value) against this table.
    pub fn route(&self, host: &str) -> RouteDecision<'_> {
        let Some(name) = strip_port(host.trim()) else {
            return RouteDecision::NotFound;
        };
        let name = name.strip_suffix('.').unwrap_or(name).to_ascii_lowercase();
        let labels: Vec<&str> = name.split('.').collect();

        let root = self.local_root();
        if !root.is_suffix_of(&labels) {
            return RouteDecision::NotFound;
        }
        let extra = &labels[..labels.len() - root.len()];

        match extra {
            [] => RouteDecision::Default {
                service: &self.primary().name,
            },
            [alias] => match self.mode() {
                AddressingMode::Single(label) => self.lookup(label.as_str(), alias),
                AddressingMode::Unrouted | AddressingMode::Multi => RouteDecision::NotFound,
            },
            [alias, service] => match self.mode() {
                AddressingMode::Multi => self.lookup(service, alias),
                AddressingMode::Single(_) | AddressingMode::Unrouted => RouteDecision::NotFound,
            },
            _ => RouteDecision::NotFound,
        }
    }

    fn lookup(&self, service: &str, alias: &str) -> RouteDecision<'_> {
        let Some(routes) = self.service(service) else {
            return RouteDecision::NotFound;
        };
        match routes.aliases.as_ref().and_then(|a| a.get(alias)) {
            Some(entry_point) => RouteDecision::Entrypoint {
                service: &routes.name,
                entry_point,
            },
            None => RouteDecision::NotFound,
        }
    }
}

/// Free-function form of [`RoutingTable::route`].
pub fn route<'a>(table: &'a RoutingTable, host: &str) -> RouteDecision<'a> {
    table.route(host)
}
