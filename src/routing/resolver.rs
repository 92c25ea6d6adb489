//! Per-service alias resolution.
//!
//! # Responsibilities
//! - Turn a service's exposure declaration into an alias table
//! - Validate every alias and the service's own label
//! - Reject alias collisions within the service
//!
//! # Design Decisions
//! - Schema-only: explicit export names are not checked against the inventory
//! - Auto-exposure branches on the `ExportKind` tag, never on anything else
//! - Collisions are per service; other services may reuse an alias

use std::collections::btree_map::{self, BTreeMap};

use crate::routing::error::ConfigError;
use crate::routing::exposure::{AliasSpec, ExportInventory, ExportKind, ExposureConfig};
use crate::routing::label::{derive_label, Label};

/// Alias → export name for one service. Injective by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<Label, String>,
}

impl AliasTable {
    /// Export name addressed by `alias`, if any.
    pub fn get(&self, alias: &str) -> Option<&str> {
        self.entries.get(alias).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(alias, export name)` in alias order.
    pub fn iter(&self) -> impl Iterator<Item = (&Label, &str)> {
        self.entries.iter().map(|(a, e)| (a, e.as_str()))
    }

    fn insert(&mut self, service: &str, alias: Label, export: &str) -> Result<(), ConfigError> {
        match self.entries.entry(alias) {
            btree_map::Entry::Occupied(existing) => Err(ConfigError::AliasCollision {
                service: service.to_string(),
                first: existing.get().clone(),
                second: export.to_string(),
                alias: existing.key().to_string(),
            }),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(export.to_string());
                Ok(())
            }
        }
    }
}

fn entry_context(export: &str, service: &str) -> String {
    format!("entry point \"{}\" of service \"{}\"", export, service)
}

/// Context string used when validating a service's own label.
pub(crate) fn service_context(service: &str) -> String {
    format!("service \"{}\"", service)
}

/// Resolve the alias table for one service.
///
/// Returns `Ok(None)` when the service opted out. An empty table means the
/// service opted in but nothing matched.
pub fn resolve(
    service: &str,
    exposure: &ExposureConfig,
    inventory: &ExportInventory,
) -> Result<Option<AliasTable>, ConfigError> {
    if exposure.is_unset() {
        return Ok(None);
    }

    Label::derive(service, &service_context(service))?;

    let mut table = AliasTable::default();
    match exposure {
        ExposureConfig::Unset => {}
        ExposureConfig::All => {
            for (export, kind) in inventory {
                if *kind != ExportKind::NamedEntrypoint {
                    continue;
                }
                let alias = Label::derive(export, &entry_context(export, service))?;
                table.insert(service, alias, export)?;
            }
        }
        ExposureConfig::Explicit(mapping) => {
            for (export, spec) in mapping {
                let alias = match spec {
                    AliasSpec::Auto => derive_label(export),
                    AliasSpec::Literal(alias) => alias.clone(),
                };
                let alias = Label::parse(alias, &entry_context(export, service))?;
                table.insert(service, alias, export)?;
            }
        }
    }

    tracing::debug!(
        service = %service,
        aliases = table.len(),
        "Resolved entry point aliases"
    );
    Ok(Some(table))
}
