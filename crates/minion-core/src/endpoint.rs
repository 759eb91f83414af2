use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Address and shared secret identifying one queue server.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub secret: String,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16, secret: impl Into<String>) -> Self {
        Endpoint {
            host: host.into(),
            port,
            secret: secret.into(),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn secret_bytes(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint {
            host: "127.0.0.1".to_string(),
            port: 50000,
            secret: "tp".to_string(),
        }
    }
}

// Keep the secret out of logs.
impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Bounded retry used while the server may not be listening yet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryPolicy {
    pub retries: u32,
    #[serde(with = "millis")]
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            retries: 50,
            delay: Duration::from_millis(100),
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_endpoint_yaml() {
        let endpoint: Endpoint = serde_yaml::from_str("host: 10.0.0.2\nsecret: hunter2").unwrap();
        assert_eq!(endpoint.address(), "10.0.0.2:50000");
        assert_eq!(endpoint.secret_bytes(), b"hunter2");
    }

    #[test]
    fn test_debug_hides_secret() {
        let endpoint = Endpoint::new("127.0.0.1", 1, "s3cr3t");
        assert!(!format!("{:?}", endpoint).contains("s3cr3t"));
    }

    #[test]
    fn test_retry_policy_yaml() {
        let policy: RetryPolicy = serde_yaml::from_str("retries: 5\ndelay: 250").unwrap();
        assert_eq!(policy.retries, 5);
        assert_eq!(policy.delay, Duration::from_millis(250));
    }
}
