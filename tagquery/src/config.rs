use crate::TagQueryError;
use anyhow::Context;
use serde::Deserialize;
use std::env;

pub const META_TAG_SUPPORT_ENV: &str = "TAGQUERY_META_TAG_SUPPORT";

/// Engine settings read once per query compilation.
///
/// Changing a config after a query was compiled has no effect on that query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// When set, an expression whose tag is missing from a metric answers
    /// `None` instead of its default decision, leaving the final call to
    /// meta tag resolution.
    pub meta_tag_support: bool,
}

impl EngineConfig {
    pub fn new(meta_tag_support: bool) -> Self {
        Self { meta_tag_support }
    }

    /// Loads `.env` if present, then reads `TAGQUERY_META_TAG_SUPPORT`.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        match env::var(META_TAG_SUPPORT_ENV) {
            Ok(raw) => {
                let meta_tag_support = parse_flag(&raw)
                    .with_context(|| format!("Failed to read {}", META_TAG_SUPPORT_ENV))?;
                Ok(Self { meta_tag_support })
            }
            Err(env::VarError::NotPresent) => Ok(Self::default()),
            Err(e) => Err(e).context(format!("Failed to read {}", META_TAG_SUPPORT_ENV)),
        }
    }
}

pub(crate) fn parse_flag(raw: &str) -> Result<bool, TagQueryError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(TagQueryError::Config(format!(
            "expected a boolean flag, found {:?}",
            raw
        ))),
    }
}
