use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "skelflow";

/// Settings applied when a graph is built and run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Capacity of every channel a composer does not override. 0 is a rendezvous.
    pub channel_capacity: usize,

    /// Node threads are named `<prefix>-<node name>`
    pub thread_name_prefix: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Accepts either the bare settings object or a document holding them
    /// under `pipeline_config`. Missing fields keep their defaults.
    pub fn from_json(config: &Value) -> Result<Self, ConfigError> {
        let section = config.get("pipeline_config").unwrap_or(config);
        Ok(serde_json::from_value(section.clone())?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json(&value)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Thread names may not contain NUL bytes, so those are dropped
    pub(crate) fn thread_name(&self, node: &str) -> String {
        format!("{}-{}", self.thread_name_prefix, node).replace('\0', "")
    }
}
