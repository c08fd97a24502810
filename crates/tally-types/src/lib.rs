//! Foundation types for Tally.
//!
//! This crate provides the record, collection, and lifecycle types shared by
//! every other Tally crate. It has no async or I/O dependencies.
//!
//! # Key Types
//!
//! - [`Resource`] -- Pending / Fulfilled / Rejected outcome of one async operation
//! - [`Expense`] -- A domain record as shown to the user
//! - [`RecordId`] -- Store-assigned identifier, or the reserved placeholder id
//! - [`ExpenseDraft`] -- The user-supplied fields of an expense
//! - [`ExpenseForm`] -- Raw text input, validated into a draft
//! - [`Collection`] -- Newest-first sequence of expenses
//! - [`ColorMode`] -- Persisted light/dark preference

pub mod collection;
pub mod color_mode;
pub mod error;
pub mod expense;
pub mod form;
pub mod resource;

pub use collection::Collection;
pub use color_mode::ColorMode;
pub use error::TypeError;
pub use expense::{format_amount, Expense, ExpenseDraft, RecordId};
pub use form::{parse_amount, ExpenseForm, FormField};
pub use resource::Resource;
