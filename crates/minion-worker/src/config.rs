use minion_core::{Endpoint, RetryPolicy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MinionConfig {
    pub endpoint: Endpoint,
    pub retry: RetryPolicy,
    pub name: Option<String>,
}

impl MinionConfig {
    pub fn new(endpoint: Endpoint) -> Self {
        MinionConfig {
            endpoint,
            ..Default::default()
        }
    }

    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: MinionConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Configured name, or `hostname-pid-random`
    pub fn minion_name(&self) -> String {
        use std::process;
        use uuid::Uuid;

        if let Some(name) = &self.name {
            return name.clone();
        }

        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string());

        let pid = process::id();
        let random = Uuid::new_v4().simple().to_string();

        format!("{}-{}-{}", hostname, pid, &random[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_from_file_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "endpoint:\n  host: 10.1.2.3\n  port: 7000\n  secret: abc\nretry:\n  retries: 3\n  delay: 20"
        )
        .unwrap();

        let config = MinionConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.endpoint.address(), "10.1.2.3:7000");
        assert_eq!(config.retry.retries, 3);
        assert_eq!(config.retry.delay, Duration::from_millis(20));
        assert!(config.name.is_none());
    }

    #[test]
    fn test_minion_name() {
        let mut config = MinionConfig::default();
        let generated = config.minion_name();
        assert!(generated.contains(&std::process::id().to_string()));
        assert_ne!(generated, config.minion_name());

        config.name = Some("minion-7".to_string());
        assert_eq!(config.minion_name(), "minion-7");
    }
}
