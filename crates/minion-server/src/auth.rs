/// The credential every client must present in its `Hello` frame.
#[derive(Clone)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        SharedSecret(secret.into())
    }

    /// Compare without short-circuiting on the first differing byte.
    pub fn verify(&self, candidate: &[u8]) -> bool {
        if candidate.len() != self.0.len() {
            return false;
        }
        self.0
            .iter()
            .zip(candidate)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify() {
        let secret = SharedSecret::new("tp");

        assert!(secret.verify(b"tp"));
        assert!(!secret.verify(b"tq"));
        assert!(!secret.verify(b"t"));
        assert!(!secret.verify(b"tpx"));
        assert!(!secret.verify(b""));
    }

    #[test]
    fn test_empty_secret() {
        let secret = SharedSecret::new(Vec::new());
        assert!(secret.verify(b""));
        assert!(!secret.verify(b"x"));
    }

    #[test]
    fn test_debug_is_redacted() {
        assert!(!format!("{:?}", SharedSecret::new("hunter2")).contains("hunter2"));
    }
}
