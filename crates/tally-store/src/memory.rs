use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use tally_types::{Expense, ExpenseDraft, RecordId};
use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::traits::ExpenseStore;

/// In-memory expense store with simulated latency.
///
/// Records are held newest-first behind a `RwLock`. Every call sleeps for the
/// configured latency before touching the list, standing in for a network
/// round trip. When a data path is configured the whole list is rewritten as
/// JSON after each successful add.
///
/// The file write is a blocking `std::fs::write` made while the write lock
/// is held, so `add` briefly blocks its runtime worker. Fine for a local data
/// file; a networked or large store should write through `spawn_blocking`.
pub struct InMemoryExpenseStore {
    records: RwLock<Vec<Expense>>,
    config: StoreConfig,
}

impl InMemoryExpenseStore {
    /// Create an empty store. Does not read `config.data_path`.
    pub fn new(config: StoreConfig) -> Self {
        Self::with_records(config, Vec::new())
    }

    /// Create a store seeded with `records` (newest-first).
    pub fn with_records(config: StoreConfig, records: Vec<Expense>) -> Self {
        Self {
            records: RwLock::new(records),
            config,
        }
    }

    /// Create a store, loading records from `config.data_path` if the file
    /// exists. A missing file yields an empty store.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        let records = match &config.data_path {
            Some(path) if path.exists() => load_records(path)?,
            _ => Vec::new(),
        };
        info!(count = records.len(), path = ?config.data_path, "expense store opened");
        Ok(Self::with_records(config, records))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().expect("lock poisoned").is_empty()
    }

    /// Copy of the stored records without simulated latency.
    pub fn snapshot(&self) -> Vec<Expense> {
        self.records.read().expect("lock poisoned").clone()
    }

    fn persist(&self, records: &[Expense]) -> StoreResult<()> {
        let Some(path) = &self.config.data_path else {
            return Ok(());
        };
        let bytes =
            serde_json::to_vec_pretty(records).map_err(|e| StoreError::persistence(path, e))?;
        std::fs::write(path, bytes).map_err(|e| StoreError::persistence(path, e))
    }
}

impl Default for InMemoryExpenseStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

#[async_trait]
impl ExpenseStore for InMemoryExpenseStore {
    async fn list(&self) -> StoreResult<Vec<Expense>> {
        info!("list");
        tokio::time::sleep(self.config.latency()).await;
        Ok(self.snapshot())
    }

    async fn add(&self, draft: ExpenseDraft) -> StoreResult<Expense> {
        info!(origin = %draft.origin, amount = draft.amount, charged = %draft.charged, "add");
        tokio::time::sleep(self.config.latency()).await;

        if self.config.is_sentinel(&draft.description) {
            warn!(description = %draft.description, "add rejected by failure sentinel");
            return Err(StoreError::Rejected(format!(
                "{} description",
                draft.description
            )));
        }

        let expense = Expense::confirmed(RecordId::generate(), Utc::now(), draft);

        let mut records = self.records.write().expect("lock poisoned");
        let mut next = Vec::with_capacity(records.len() + 1);
        next.push(expense.clone());
        next.extend(records.iter().cloned());
        // Write before swapping in so a failed write leaves the list as it was.
        self.persist(&next)?;
        *records = next;

        Ok(expense)
    }
}

impl std::fmt::Debug for InMemoryExpenseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryExpenseStore")
            .field("record_count", &self.len())
            .field("config", &self.config)
            .finish()
    }
}

fn load_records(path: &Path) -> StoreResult<Vec<Expense>> {
    let bytes = std::fs::read(path).map_err(|e| StoreError::persistence(path, e))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let records: Vec<Expense> = serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if records.iter().any(Expense::is_placeholder) {
        return Err(StoreError::Corrupt {
            path: path.to_path_buf(),
            reason: format!("record id {:?} is reserved for placeholders", RecordId::PENDING),
        });
    }
    Ok(records)
}
