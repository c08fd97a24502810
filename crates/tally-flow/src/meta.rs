use serde::{Deserialize, Serialize};
use tally_types::Collection;

/// Distinct origins and counterparties seen in a collection, in first-seen
/// (newest-first) order. Feeds autocomplete in the add form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub origins: Vec<String>,
    pub people: Vec<String>,
}

impl Meta {
    pub fn from_collection(collection: &Collection) -> Self {
        let mut meta = Self::default();
        for expense in collection.iter() {
            if !meta.origins.contains(&expense.origin) {
                meta.origins.push(expense.origin.clone());
            }
            if !meta.people.contains(&expense.charged) {
                meta.people.push(expense.charged.clone());
            }
        }
        meta
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty() && self.people.is_empty()
    }
}
