//! Backing stores for Tally.
//!
//! The reactive core treats persistence as an external collaborator reached
//! through two small traits:
//!
//! - [`ExpenseStore`] -- asynchronous `list()` / `add(draft)` for expense records
//! - [`KeyValueStore`] -- synchronous string preferences (color mode)
//!
//! # Backends
//!
//! - [`InMemoryExpenseStore`] -- records held in memory with simulated latency,
//!   an optional JSON data file, and a failure sentinel for exercising
//!   rejection handling
//! - [`InMemoryKeyValueStore`] -- `HashMap`-based preferences for tests
//! - [`JsonFileKeyValueStore`] -- preferences persisted as a JSON object on disk
//!
//! # Design Rules
//!
//! 1. Stores assign identifiers and timestamps; clients never do.
//! 2. A failed `add` leaves the stored list unchanged.
//! 3. Records are returned newest-first.

pub mod config;
pub mod error;
pub mod memory;
pub mod prefs;
pub mod traits;

pub use config::StoreConfig;
pub use error::{PreferenceError, StoreError, StoreResult};
pub use memory::InMemoryExpenseStore;
pub use prefs::{InMemoryKeyValueStore, JsonFileKeyValueStore};
pub use traits::{ExpenseStore, KeyValueStore};
