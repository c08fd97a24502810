use async_trait::async_trait;
use tally_types::{Expense, ExpenseDraft};

use crate::error::{PreferenceError, StoreResult};

/// Asynchronous backing store for the expense collection.
///
/// Implementations must satisfy these invariants:
/// - `list()` returns records newest-first.
/// - `add()` assigns the record id and creation timestamp; the id is never
///   the reserved placeholder value.
/// - A failed `add()` leaves the stored records unchanged.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Fetch the full current collection.
    async fn list(&self) -> StoreResult<Vec<Expense>>;

    /// Persist a new record and return it with its store-assigned metadata.
    async fn add(&self, draft: ExpenseDraft) -> StoreResult<Expense>;
}

/// Synchronous string key-value store for local preferences.
pub trait KeyValueStore: Send + Sync {
    /// Read a key. Returns `Ok(None)` if it has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    /// Write a key, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}
