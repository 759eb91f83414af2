use minion_core::{Endpoint, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    pub endpoint: Endpoint,
    /// Retry policy handed to every minion
    pub retry: RetryPolicy,
    /// Give up collecting results after this long. Unset means wait forever.
    pub collect_timeout_secs: Option<u64>,
}

impl BossConfig {
    pub fn new(endpoint: Endpoint) -> Self {
        BossConfig {
            endpoint,
            ..Default::default()
        }
    }

    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: BossConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn collect_timeout(&self) -> Option<Duration> {
        self.collect_timeout_secs.map(Duration::from_secs)
    }
}
