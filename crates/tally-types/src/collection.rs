use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::expense::Expense;

/// Ordered, newest-first sequence of expenses.
///
/// A collection is a materialized view: every value handed to consumers is
/// complete. Mutation helpers are used only by the optimistic merger, which
/// owns the authoritative copy and publishes clones.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection(Vec<Expense>);

impl Collection {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn into_vec(self) -> Vec<Expense> {
        self.0
    }

    /// The newest record, if any.
    pub fn head(&self) -> Option<&Expense> {
        self.0.first()
    }

    /// Insert a record at the front (newest position).
    pub fn prepend(&mut self, expense: Expense) {
        self.0.insert(0, expense);
    }

    /// Replace the record at `index`, returning the previous one.
    pub fn replace_at(&mut self, index: usize, expense: Expense) -> Option<Expense> {
        let slot = self.0.get_mut(index)?;
        Some(std::mem::replace(slot, expense))
    }

    /// Remove the record at `index`.
    pub fn remove_at(&mut self, index: usize) -> Option<Expense> {
        if index < self.0.len() {
            Some(self.0.remove(index))
        } else {
            None
        }
    }

    /// Position of the front-most optimistic placeholder.
    pub fn placeholder_position(&self) -> Option<usize> {
        self.0.iter().position(Expense::is_placeholder)
    }

    /// Number of optimistic placeholders currently in the collection.
    pub fn placeholder_count(&self) -> usize {
        self.0.iter().filter(|e| e.is_placeholder()).count()
    }
}

impl Deref for Collection {
    type Target = [Expense];

    fn deref(&self) -> &[Expense] {
        &self.0
    }
}

impl From<Vec<Expense>> for Collection {
    fn from(records: Vec<Expense>) -> Self {
        Self(records)
    }
}

impl FromIterator<Expense> for Collection {
    fn from_iter<I: IntoIterator<Item = Expense>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Expense;
    type IntoIter = std::slice::Iter<'a, Expense>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
