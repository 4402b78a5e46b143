//! Shared fixtures for the tagquery integration tests

#![allow(dead_code)]

use tagquery::{MetricDefinition, MetricKey};

/// Metric population used across tests, as the index would hand it over
pub const SAMPLE_DEFINITIONS: &str = r#"[
    {"id": {"org": 1, "hash": [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1]}, "name": "cpu", "tags": ["host=web01", "env=prod", "dc=eu-west"]},
    {"id": {"org": 1, "hash": [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,2]}, "name": "cpu", "tags": ["host=web02", "env=prod", "dc=eu-west"]},
    {"id": {"org": 1, "hash": [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,3]}, "name": "cpu", "tags": ["host=web01", "env=staging", "dc=us-east"]},
    {"id": {"org": 1, "hash": [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,4]}, "name": "mem", "tags": ["host=db01", "region=eu", "canary"]},
    {"id": {"org": 1, "hash": [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,5]}, "name": "disk", "tags": []}
]"#;

pub fn log_init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn sample_definitions() -> Vec<MetricDefinition> {
    serde_json::from_str(SAMPLE_DEFINITIONS).expect("Failed to parse sample definitions")
}

/// Create a test metric key with predictable values
pub fn test_metric_key(id: u8) -> MetricKey {
    let mut hash = [0u8; 16];
    hash[0] = 1;
    hash[15] = id;
    MetricKey::new(1, hash)
}

pub fn metric(id: u8, name: &str, tags: &[&str]) -> MetricDefinition {
    MetricDefinition::new(test_metric_key(id), name, tags)
}
