use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for [`InMemoryExpenseStore`](crate::InMemoryExpenseStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Simulated round-trip latency applied to every call, in milliseconds.
    pub latency_ms: u64,
    /// Description value that makes `add` fail deterministically.
    /// `None` disables the sentinel.
    pub failure_sentinel: Option<String>,
    /// JSON file the record list is loaded from and written back to.
    /// `None` keeps records in memory only.
    pub data_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            latency_ms: 2000,
            failure_sentinel: Some("bad".into()),
            data_path: None,
        }
    }
}

impl StoreConfig {
    /// Zero-latency, memory-only configuration for tests and embedding.
    pub fn instant() -> Self {
        Self {
            latency_ms: 0,
            ..Default::default()
        }
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    /// Returns `true` if `description` is the configured failure sentinel.
    pub fn is_sentinel(&self, description: &str) -> bool {
        self.failure_sentinel.as_deref() == Some(description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert_eq!(c.latency(), Duration::from_secs(2));
        assert!(c.is_sentinel("bad"));
        assert!(!c.is_sentinel("good"));
        assert!(c.data_path.is_none());
    }

    #[test]
    fn instant_keeps_sentinel() {
        let c = StoreConfig::instant();
        assert_eq!(c.latency(), Duration::ZERO);
        assert!(c.is_sentinel("bad"));
    }

    #[test]
    fn disabled_sentinel_matches_nothing() {
        let c = StoreConfig {
            failure_sentinel: None,
            ..StoreConfig::instant()
        };
        assert!(!c.is_sentinel("bad"));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let c: StoreConfig = serde_json::from_str(r#"{"latency_ms": 5}"#).unwrap();
        assert_eq!(c.latency_ms, 5);
        assert_eq!(c.failure_sentinel.as_deref(), Some("bad"));
    }
}
