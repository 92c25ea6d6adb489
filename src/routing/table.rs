//! Session-wide routing table.
//!
//! # Responsibilities
//! - Resolve every service's alias table
//! - Derive service labels and reject collisions across services
//! - Select exactly one primary service
//! - Fix the addressing mode once, at build time
//!
//! # Design Decisions
//! - Immutable after construction; rebuilt wholesale on reconfiguration
//! - Services that opted out still get a label (they stay "known")

use std::collections::BTreeMap;

use crate::routing::error::ConfigError;
use crate::routing::exposure::{ExportInventory, ExposureConfig};
use crate::routing::label::{Label, LocalRoot};
use crate::routing::resolver::{resolve, service_context, AliasTable};

/// Everything the builder needs to know about one service.
#[derive(Debug, Clone, Default)]
pub struct ServiceDefinition {
    /// Declared service name.
    pub name: String,
    /// Explicitly marked as the service handling the bare root host.
    pub primary: bool,
    pub exposure: ExposureConfig,
    pub exports: ExportInventory,
}

impl ServiceDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    pub fn exposure(mut self, exposure: ExposureConfig) -> Self {
        self.exposure = exposure;
        self
    }

    pub fn exports(mut self, exports: ExportInventory) -> Self {
        self.exports = exports;
        self
    }
}

/// One active service as seen by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRoutes {
    pub name: String,
    pub label: Label,
    /// `None` when the service opted out of entry point routing.
    pub aliases: Option<AliasTable>,
}

/// How one-label hosts are interpreted, fixed at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressingMode {
    /// No service exposes entry points.
    Unrouted,
    /// Exactly one service exposes entry points; one-label hosts address it.
    Single(Label),
    /// Several services expose entry points; only two-label hosts route.
    Multi,
}

/// Immutable, session-wide routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingTable {
    root: LocalRoot,
    services: BTreeMap<Label, ServiceRoutes>,
    primary: Label,
    mode: AddressingMode,
}

impl RoutingTable {
    /// Build the table for one session.
    pub fn build(root: LocalRoot, services: &[ServiceDefinition]) -> Result<Self, ConfigError> {
        let primary = select_primary(services)?;

        let mut table: BTreeMap<Label, ServiceRoutes> = BTreeMap::new();
        for def in services {
            let label = Label::derive(&def.name, &service_context(&def.name))?;
            if let Some(existing) = table.get(label.as_str()) {
                return Err(ConfigError::ServiceLabelCollision {
                    first: existing.name.clone(),
                    second: def.name.clone(),
                    label: label.to_string(),
                });
            }
            let aliases = resolve(&def.name, &def.exposure, &def.exports)?;
            table.insert(
                label.clone(),
                ServiceRoutes {
                    name: def.name.clone(),
                    label,
                    aliases,
                },
            );
        }

        // Labels were validated above, so deriving again cannot fail.
        let primary = Label::derive(&primary.name, &service_context(&primary.name))?;

        let mut exposing = table.values().filter(|s| s.aliases.is_some());
        let mode = match (exposing.next(), exposing.next()) {
            (None, _) => AddressingMode::Unrouted,
            (Some(only), None) => AddressingMode::Single(only.label.clone()),
            (Some(_), Some(_)) => AddressingMode::Multi,
        };

        tracing::info!(
            services = table.len(),
            primary = %primary,
            mode = ?mode,
            root = %root,
            "Routing table built"
        );

        Ok(Self {
            root,
            services: table,
            primary,
            mode,
        })
    }

    pub fn local_root(&self) -> &LocalRoot {
        &self.root
    }

    pub fn mode(&self) -> &AddressingMode {
        &self.mode
    }

    /// The service handling the bare root host.
    pub fn primary(&self) -> &ServiceRoutes {
        // `primary` is always a key of `services`.
        &self.services[self.primary.as_str()]
    }

    /// Look up an active service by its label.
    pub fn service(&self, label: &str) -> Option<&ServiceRoutes> {
        self.services.get(label)
    }

    /// All active service labels, including services without an alias table.
    pub fn service_labels(&self) -> impl Iterator<Item = &Label> {
        self.services.keys()
    }

    /// Alias table of the service with `label`, if it opted in.
    pub fn aliases(&self, label: &str) -> Option<&AliasTable> {
        self.services.get(label).and_then(|s| s.aliases.as_ref())
    }

    /// Every addressable virtual host (without port) and what it reaches.
    pub fn hostnames(&self) -> Vec<(String, String)> {
        let root = &self.root;
        let primary = self.primary();
        let mut hosts = vec![(root.to_string(), format!("{} (default)", primary.name))];

        for service in self.services.values() {
            let Some(aliases) = &service.aliases else {
                continue;
            };
            for (alias, export) in aliases.iter() {
                let host = match &self.mode {
                    AddressingMode::Single(_) => format!("{}.{}", alias, root),
                    _ => format!("{}.{}.{}", alias, service.label, root),
                };
                hosts.push((host, format!("{}/{}", service.name, export)));
            }
        }
        hosts
    }
}

fn select_primary(services: &[ServiceDefinition]) -> Result<&ServiceDefinition, ConfigError> {
    let marked: Vec<&ServiceDefinition> = services.iter().filter(|s| s.primary).collect();
    match marked.as_slice() {
        [] => services.first().ok_or(ConfigError::NoServices),
        [only] => Ok(only),
        many => Err(ConfigError::AmbiguousPrimary {
            services: many.iter().map(|s| s.name.clone()).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::exposure::ExportKind;

    fn named(names: &[&str]) -> ExportInventory {
        names
            .iter()
            .map(|n| (n.to_string(), ExportKind::NamedEntrypoint))
            .collect()
    }

    #[test]
    fn test_first_service_is_primary_by_default() {
        let table = RoutingTable::build(
            LocalRoot::default(),
            &[ServiceDefinition::new("worker-a"), ServiceDefinition::new("worker-b")],
        )
        .unwrap();
        assert_eq!(table.primary().name, "worker-a");
        assert_eq!(table.mode(), &AddressingMode::Unrouted);
    }

    #[test]
    fn test_explicit_primary_wins() {
        let table = RoutingTable::build(
            LocalRoot::default(),
            &[
                ServiceDefinition::new("worker-a"),
                ServiceDefinition::new("worker-b").primary(true),
            ],
        )
        .unwrap();
        assert_eq!(table.primary().name, "worker-b");
    }

    #[test]
    fn test_multiple_primaries_rejected() {
        let err = RoutingTable::build(
            LocalRoot::default(),
            &[
                ServiceDefinition::new("worker-a").primary(true),
                ServiceDefinition::new("worker-b").primary(true),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::AmbiguousPrimary {
                services: vec!["worker-a".into(), "worker-b".into()]
            }
        );
    }

    #[test]
    fn test_no_services_rejected() {
        let err = RoutingTable::build(LocalRoot::default(), &[]).unwrap_err();
        assert_eq!(err, ConfigError::NoServices);
    }

    #[test]
    fn test_service_label_collision() {
        let err = RoutingTable::build(
            LocalRoot::default(),
            &[ServiceDefinition::new("Worker_A"), ServiceDefinition::new("worker-a")],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::ServiceLabelCollision {
                first: "Worker_A".into(),
                second: "worker-a".into(),
                label: "worker-a".into(),
            }
        );
    }

    #[test]
    fn test_opted_out_service_still_needs_valid_label() {
        let err = RoutingTable::build(LocalRoot::default(), &[ServiceDefinition::new("-bad")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLabel { .. }));
    }

    #[test]
    fn test_same_alias_in_different_services_allowed() {
        let table = RoutingTable::build(
            LocalRoot::default(),
            &[
                ServiceDefinition::new("worker-a")
                    .exposure(ExposureConfig::All)
                    .exports(named(&["Echo"])),
                ServiceDefinition::new("worker-b")
                    .exposure(ExposureConfig::All)
                    .exports(named(&["Echo"])),
            ],
        )
        .unwrap();
        assert_eq!(table.mode(), &AddressingMode::Multi);
        assert_eq!(table.aliases("worker-a").unwrap().get("echo"), Some("Echo"));
        assert_eq!(table.aliases("worker-b").unwrap().get("echo"), Some("Echo"));
    }

    #[test]
    fn test_single_mode_ignores_opted_out_services() {
        let table = RoutingTable::build(
            LocalRoot::default(),
            &[
                ServiceDefinition::new("worker-a"),
                ServiceDefinition::new("worker-b")
                    .exposure(ExposureConfig::All)
                    .exports(named(&["Echo"])),
            ],
        )
        .unwrap();
        assert_eq!(
            table.mode(),
            &AddressingMode::Single(Label::parse("worker-b", "test").unwrap())
        );
        let labels: Vec<&str> = table.service_labels().map(Label::as_str).collect();
        assert_eq!(labels, vec!["worker-a", "worker-b"]);
        assert!(table.aliases("worker-a").is_none());
    }

    #[test]
    fn test_hostnames_listing() {
        let table = RoutingTable::build(
            LocalRoot::default(),
            &[ServiceDefinition::new("worker-a")
                .exposure(ExposureConfig::All)
                .exports(named(&["Greet"]))],
        )
        .unwrap();
        let hosts = table.hostnames();
        assert_eq!(
            hosts,
            vec![
                ("localhost".to_string(), "worker-a (default)".to_string()),
                ("greet.localhost".to_string(), "worker-a/Greet".to_string()),
            ]
        );
    }
}
