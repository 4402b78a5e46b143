use crate::TagQueryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const METRIC_KEY_HASH_LEN: usize = 16;

/// Opaque metric identity: the owning org plus a hash of the definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetricKey {
    pub org: u32,
    pub hash: [u8; METRIC_KEY_HASH_LEN],
}

impl MetricKey {
    pub fn new(org: u32, hash: [u8; METRIC_KEY_HASH_LEN]) -> Self {
        Self { org, hash }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.org, hex::encode(self.hash))
    }
}

impl FromStr for MetricKey {
    type Err = TagQueryError;

    /// Parses the `<org>.<32 hex chars>` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TagQueryError::InvalidMetricKey(s.to_string());
        let (org, hash) = s.split_once('.').ok_or_else(invalid)?;
        let org = org.parse::<u32>().map_err(|_| invalid())?;
        let bytes = hex::decode(hash).map_err(|_| invalid())?;
        let hash: [u8; METRIC_KEY_HASH_LEN] = bytes.try_into().map_err(|_| invalid())?;
        Ok(Self { org, hash })
    }
}

/// The part of a metric definition the engine looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub id: MetricKey,
    pub name: String,
    /// `key=value` or bare `key` strings.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MetricDefinition {
    pub fn new(id: MetricKey, name: &str, tags: &[&str]) -> Self {
        Self {
            id,
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Splits a tag into key and value. A bare `key` has an empty value.
pub fn split_tag(tag: &str) -> (&str, &str) {
    tag.split_once('=').unwrap_or((tag, ""))
}

/// Returns the value of `tag` if the tag is filed under `key`.
pub(crate) fn tag_value<'a>(tag: &'a str, key: &str) -> Option<&'a str> {
    let rest = tag.strip_prefix(key)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix('=')
    }
}
