use crate::MetricKey;
use std::collections::HashMap;

/// Resolves a metric to the meta tags an external rule engine assigns it.
///
/// Implementations handle their own backend failures and return an empty
/// list when nothing can be resolved.
pub trait IdTagLookup: Send + Sync {
    /// Meta tags of `id`, in `key=value` form.
    fn meta_tags(&self, id: &MetricKey) -> Vec<String>;
}

/// Fixed meta tag assignments, for tests and for callers that precompute
/// the rule engine output.
#[derive(Debug, Clone, Default)]
pub struct StaticTagLookup {
    tags: HashMap<MetricKey, Vec<String>>,
}

impl StaticTagLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: MetricKey, tag: &str) {
        self.tags.entry(id).or_default().push(tag.to_string());
    }
}

impl IdTagLookup for StaticTagLookup {
    fn meta_tags(&self, id: &MetricKey) -> Vec<String> {
        self.tags.get(id).cloned().unwrap_or_default()
    }
}
