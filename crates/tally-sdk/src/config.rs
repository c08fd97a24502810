use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tally_flow::FlowConfig;
use tally_store::StoreConfig;
use tally_types::ColorMode;

use crate::error::{SdkError, SdkResult};

/// Color-mode preference settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Key the mode is stored under.
    pub storage_key: String,
    /// Mode used when nothing valid is stored.
    pub default: ColorMode,
    /// JSON file holding preferences. `None` keeps them in memory.
    pub prefs_path: Option<PathBuf>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: "colorMode".into(),
            default: ColorMode::Light,
            prefs_path: None,
        }
    }
}

/// Top-level configuration, loaded from TOML.
///
/// ```toml
/// [store]
/// latency_ms = 2000
/// failure_sentinel = "bad"
/// data_path = "expenses.json"
///
/// [flow]
/// search_debounce_ms = 500
///
/// [theme]
/// storage_key = "colorMode"
/// default = "dark"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    pub store: StoreConfig,
    pub flow: FlowConfig,
    pub theme: ThemeConfig,
}

impl TallyConfig {
    pub fn from_toml_str(source: &str) -> SdkResult<Self> {
        toml::from_str(source).map_err(|e| SdkError::Config {
            path: PathBuf::from("<inline>"),
            reason: e.to_string(),
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        toml::from_str(&source).map_err(|e| SdkError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
