//! Hostname label grammar.
//!
//! A label is valid iff it matches `^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$`.
//! Checked by hand in one pass; no regex in this path.

use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;

use crate::routing::error::ConfigError;

/// Maximum length of a single hostname label.
pub const MAX_LABEL_LEN: usize = 63;

/// A validated hostname label (entry alias or service label).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// Validate `label` and wrap it.
    ///
    /// `context` only feeds the error message, e.g. `entry point "Greet" of service "worker-a"`.
    pub fn parse(label: impl Into<String>, context: &str) -> Result<Self, ConfigError> {
        let label = label.into();
        validate(&label, context)?;
        Ok(Self(label))
    }

    /// Derive a label from a free-form name, then validate it.
    pub fn derive(name: &str, context: &str) -> Result<Self, ConfigError> {
        Self::parse(derive_label(name), context)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Label {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns true if `label` satisfies the hostname-label grammar.
pub fn is_valid_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    if bytes.is_empty() || bytes.len() > MAX_LABEL_LEN {
        return false;
    }
    let edge = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    let inner = |b: u8| edge(b) || b == b'-';

    edge(bytes[0]) && edge(bytes[bytes.len() - 1]) && bytes.iter().all(|&b| inner(b))
}

/// Validate a candidate label. `context` has no effect on acceptance.
pub fn validate(label: &str, context: &str) -> Result<(), ConfigError> {
    if is_valid_label(label) {
        Ok(())
    } else {
        Err(ConfigError::InvalidLabel {
            label: label.to_string(),
            context: context.to_string(),
        })
    }
}

/// Lowercase `name` and replace every character outside `[a-z0-9-]` with `-`.
///
/// Never trims, so the result may still be invalid (`_private` → `-private`).
pub fn derive_label(name: &str) -> String {
    name.chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// The local root suffix every routed host must end with (e.g. `localhost`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRoot {
    labels: Vec<Label>,
}

impl LocalRoot {
    /// Parse a dot-separated root such as `localhost` or `dev.test`.
    pub fn parse(root: &str) -> Result<Self, ConfigError> {
        let context = format!("local root \"{}\"", root);
        let labels = root
            .split('.')
            .map(|l| Label::parse(l, &context))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { labels })
    }

    /// Number of labels in the root.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns true if `labels` ends with this root.
    pub fn is_suffix_of(&self, labels: &[&str]) -> bool {
        labels.len() >= self.labels.len()
            && labels[labels.len() - self.labels.len()..]
                .iter()
                .zip(&self.labels)
                .all(|(got, want)| *got == want.as_str())
    }
}

impl Default for LocalRoot {
    fn default() -> Self {
        Self {
            labels: vec![Label("localhost".to_string())],
        }
    }
}

impl fmt::Display for LocalRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, label) in self.labels.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(label.as_str())?;
        }
        Ok(())
    }
}
