//! High-level SDK for Tally.
//!
//! Ties the backing store, the flow stages and the preferences together
//! behind a small API. This is the main entry point for applications
//! embedding Tally.
//!
//! ```no_run
//! # async fn demo() -> tally_sdk::SdkResult<()> {
//! use std::sync::Arc;
//! use tally_sdk::{Expenses, TallyConfig, InMemoryExpenseStore};
//!
//! let config = TallyConfig::default();
//! let store = Arc::new(InMemoryExpenseStore::open(config.store.clone())?);
//! let session = Expenses::open(store, &config.flow).await?;
//! session.on_search_change("cafe")?;
//! # Ok(())
//! # }
//! ```

pub mod color_mode;
pub mod config;
pub mod error;
pub mod session;

pub use color_mode::ColorModeController;
pub use config::{TallyConfig, ThemeConfig};
pub use error::{SdkError, SdkResult};
pub use session::Expenses;

// Re-export key types
pub use tally_flow::{FilteredView, FlowConfig, Meta, Settlement, WorkflowEvent, WorkflowState};
pub use tally_store::{
    ExpenseStore, InMemoryExpenseStore, InMemoryKeyValueStore, JsonFileKeyValueStore,
    KeyValueStore, StoreConfig, StoreError,
};
pub use tally_types::{Collection, ColorMode, Expense, ExpenseDraft, ExpenseForm, RecordId};
