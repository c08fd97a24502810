use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning knobs for the flow stages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Quiet period applied to search input before a filter pass, in
    /// milliseconds.
    pub search_debounce_ms: u64,
    /// Buffer size of the settlement broadcast channel.
    pub settlement_capacity: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: 500,
            settlement_capacity: 64,
        }
    }
}

impl FlowConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}
