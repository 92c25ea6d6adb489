//! Configuration-time routing errors.
//!
//! Every variant is fatal: a session whose routing table cannot be built
//! must not start. Request-time lookups never produce these.

use thiserror::Error;

/// Errors raised while resolving aliases or assembling the routing table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A label does not match the hostname-label grammar.
    #[error(
        "Invalid hostname label \"{label}\" for {context}. Labels must contain only lowercase \
         alphanumeric characters and hyphens, must not start or end with a hyphen, and must be \
         1-63 characters long."
    )]
    InvalidLabel { label: String, context: String },

    /// Two exports of one service resolved to the same alias.
    #[error(
        "Alias collision in service \"{service}\": entry points \"{first}\" and \"{second}\" \
         both map to alias \"{alias}\"."
    )]
    AliasCollision {
        service: String,
        first: String,
        second: String,
        alias: String,
    },

    /// Two services derived the same service label.
    #[error(
        "Service label collision: services \"{first}\" and \"{second}\" both map to label \"{label}\"."
    )]
    ServiceLabelCollision {
        first: String,
        second: String,
        label: String,
    },

    /// More than one service was marked as primary.
    #[error("Multiple services are marked primary: {}", .services.join(", "))]
    AmbiguousPrimary { services: Vec<String> },

    /// The session has no services at all, so no primary can be chosen.
    #[error("No services configured; a session needs at least one primary service")]
    NoServices,
}
