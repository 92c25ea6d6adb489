//! Exposure declarations and export inventories.
//!
//! These are the inputs the resolver consumes. The export inventory is
//! produced by static analysis of a service's code; the exposure config
//! comes from the user's declaration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kind tag attached to every export by static analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportKind {
    /// A named, independently invocable entry point. Eligible for auto-exposure.
    NamedEntrypoint,
    /// Anything else, including the default export.
    Other,
}

/// Export name → kind, for one service.
pub type ExportInventory = BTreeMap<String, ExportKind>;

/// How the alias for one explicitly exposed export is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasSpec {
    /// Derive the alias from the export name.
    Auto,
    /// Use this alias as written.
    Literal(String),
}

/// A service's `expose_entrypoints` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "RawExposure")]
pub enum ExposureConfig {
    /// Opt-out: nothing is exposed.
    #[default]
    Unset,
    /// Expose every named-entrypoint export under its derived alias.
    All,
    /// Export name → alias choice.
    Explicit(BTreeMap<String, AliasSpec>),
}

impl ExposureConfig {
    pub fn is_unset(&self) -> bool {
        matches!(self, ExposureConfig::Unset)
    }
}

/// Wire shape: `true | false | { Export = "alias" | true }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawExposure {
    Flag(bool),
    Map(BTreeMap<String, RawAlias>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAlias {
    Flag(bool),
    Alias(String),
}

impl TryFrom<RawExposure> for ExposureConfig {
    type Error = String;

    fn try_from(raw: RawExposure) -> Result<Self, Self::Error> {
        match raw {
            RawExposure::Flag(false) => Ok(ExposureConfig::Unset),
            RawExposure::Flag(true) => Ok(ExposureConfig::All),
            RawExposure::Map(entries) => entries
                .into_iter()
                .map(|(export, alias)| match alias {
                    RawAlias::Flag(true) => Ok((export, AliasSpec::Auto)),
                    RawAlias::Alias(alias) => Ok((export, AliasSpec::Literal(alias))),
                    RawAlias::Flag(false) => Err(format!(
                        "expose_entrypoints.{export} must be `true` or an alias string, not `false`"
                    )),
                })
                .collect::<Result<BTreeMap<_, _>, _>>()
                .map(ExposureConfig::Explicit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default)]
        expose: ExposureConfig,
        #[serde(default)]
        exports: ExportInventory,
    }

    #[test]
    fn test_parse_flags() {
        let h: Holder = toml::from_str("expose = true").unwrap();
        assert_eq!(h.expose, ExposureConfig::All);

        let h: Holder = toml::from_str("expose = false").unwrap();
        assert!(h.expose.is_unset());

        let h: Holder = toml::from_str("").unwrap();
        assert!(h.expose.is_unset());
    }

    #[test]
    fn test_parse_explicit_map() {
        let h: Holder = toml::from_str(
            r#"
            [expose]
            Greet = "hello"
            Farewell = true
            "#,
        )
        .unwrap();
        let ExposureConfig::Explicit(map) = h.expose else {
            panic!("expected explicit map");
        };
        assert_eq!(map["Greet"], AliasSpec::Literal("hello".into()));
        assert_eq!(map["Farewell"], AliasSpec::Auto);
    }

    #[test]
    fn test_reject_false_in_map() {
        let res: Result<Holder, _> = toml::from_str(
            r#"
            [expose]
            Greet = false
            "#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_parse_inventory() {
        let h: Holder = toml::from_str(
            r#"
            [exports]
            Greet = "named-entrypoint"
            default = "other"
            "#,
        )
        .unwrap();
        assert_eq!(h.exports["Greet"], ExportKind::NamedEntrypoint);
        assert_eq!(h.exports["default"], ExportKind::Other);
    }
}
