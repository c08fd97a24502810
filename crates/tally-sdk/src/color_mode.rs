use std::sync::Arc;

use tally_store::KeyValueStore;
use tally_types::ColorMode;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::SdkResult;

/// Persisted light/dark preference.
///
/// The stored value is read once at construction. Anything other than
/// `"light"` or `"dark"` falls back to the configured default. Every value
/// the controller takes on, the initial one included, is written back under
/// the storage key.
pub struct ColorModeController {
    store: Arc<dyn KeyValueStore>,
    key: String,
    mode: watch::Sender<ColorMode>,
}

impl ColorModeController {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        default: ColorMode,
    ) -> SdkResult<Self> {
        let key = key.into();
        let initial = match store.get(&key)? {
            Some(stored) => stored.parse().unwrap_or_else(|_| {
                warn!(key = %key, value = %stored, "unrecognized color mode; using default");
                default
            }),
            None => default,
        };
        store.set(&key, initial.as_str())?;
        debug!(key = %key, mode = %initial, "color mode loaded");

        let (mode, _) = watch::channel(initial);
        Ok(Self { store, key, mode })
    }

    pub fn current(&self) -> ColorMode {
        *self.mode.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ColorMode> {
        self.mode.subscribe()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Flip the mode, persist it, and publish it. Returns the new mode.
    pub fn toggle(&self) -> SdkResult<ColorMode> {
        let next = self.current().toggled();
        self.store.set(&self.key, next.as_str())?;
        self.mode.send_replace(next);
        debug!(key = %self.key, mode = %next, "color mode toggled");
        Ok(next)
    }
}

impl std::fmt::Debug for ColorModeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorModeController")
            .field("key", &self.key)
            .field("mode", &self.current())
            .finish()
    }
}
