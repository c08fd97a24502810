use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identifier of an expense record.
///
/// Confirmed records carry an id assigned by the backing store (UUID v7 for
/// the bundled stores). The literal `"pending"` is reserved for optimistic
/// placeholders and is never produced by a store.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// The reserved placeholder identifier.
    pub const PENDING: &'static str = "pending";

    /// The placeholder id used for not-yet-confirmed records.
    pub fn pending() -> Self {
        Self(Self::PENDING.to_string())
    }

    /// Generate a fresh store id (UUID v7, time-ordered).
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Wrap a store-assigned id, refusing the reserved placeholder value.
    pub fn confirmed(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id == Self::PENDING {
            return Err(TypeError::ReservedId(id));
        }
        Ok(Self(id))
    }

    pub fn is_pending(&self) -> bool {
        self.0 == Self::PENDING
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The user-supplied part of an expense; what the backing store accepts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    /// Where the money went (shop, venue, ...).
    pub origin: String,
    /// Free-form description. May be empty.
    pub description: String,
    /// Amount in minor currency units (cents).
    pub amount: u64,
    /// The person charged for the expense.
    pub charged: String,
}

impl ExpenseDraft {
    pub fn new(
        origin: impl Into<String>,
        description: impl Into<String>,
        amount: u64,
        charged: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            description: description.into(),
            amount,
            charged: charged.into(),
        }
    }
}

/// A single expense record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub origin: String,
    pub description: String,
    /// Amount in minor currency units (cents).
    pub amount: u64,
    pub charged: String,
}

impl Expense {
    /// Build a confirmed record from a draft and store-assigned metadata.
    pub fn confirmed(id: RecordId, created_at: DateTime<Utc>, draft: ExpenseDraft) -> Self {
        Self {
            id,
            created_at,
            origin: draft.origin,
            description: draft.description,
            amount: draft.amount,
            charged: draft.charged,
        }
    }

    /// Build the optimistic placeholder shown while `draft` is being added.
    pub fn placeholder(draft: &ExpenseDraft) -> Self {
        Self::confirmed(RecordId::pending(), Utc::now(), draft.clone())
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.is_pending()
    }

    /// The user-supplied fields of this record.
    pub fn draft(&self) -> ExpenseDraft {
        ExpenseDraft {
            origin: self.origin.clone(),
            description: self.description.clone(),
            amount: self.amount,
            charged: self.charged.clone(),
        }
    }

    /// Amount rendered for display, e.g. `"$12.5"`.
    pub fn formatted_amount(&self) -> String {
        format_amount(self.amount)
    }
}

/// Render an amount in minor units as a dollar string.
///
/// The fractional part is printed in its shortest form: 500 → `"$5"`,
/// 550 → `"$5.5"`, 1234 → `"$12.34"`.
pub fn format_amount(minor: u64) -> String {
    let whole = minor / 100;
    let cents = minor % 100;
    if cents == 0 {
        format!("${whole}")
    } else if cents % 10 == 0 {
        format!("${whole}.{}", cents / 10)
    } else {
        format!("${whole}.{cents:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_draft() -> ExpenseDraft {
        ExpenseDraft::new("Store", "Milk", 500, "Ann")
    }

    #[test]
    fn pending_id_is_reserved() {
        assert!(RecordId::pending().is_pending());
        assert_eq!(
            RecordId::confirmed("pending"),
            Err(TypeError::ReservedId("pending".into()))
        );
        assert!(!RecordId::confirmed("1").unwrap().is_pending());
    }

    #[test]
    fn generated_ids_are_unique_and_not_pending() {
        let a = RecordId::generate();
        let b = RecordId::generate();
        assert_ne!(a, b);
        assert!(!a.is_pending());
    }

    #[test]
    fn placeholder_copies_draft_fields() {
        let draft = sample_draft();
        let placeholder = Expense::placeholder(&draft);
        assert!(placeholder.is_placeholder());
        assert_eq!(placeholder.draft(), draft);
    }

    #[test]
    fn format_amount_shortest_form() {
        assert_eq!(format_amount(500), "$5");
        assert_eq!(format_amount(550), "$5.5");
        assert_eq!(format_amount(1234), "$12.34");
        assert_eq!(format_amount(1205), "$12.05");
        assert_eq!(format_amount(7), "$0.07");
        assert_eq!(format_amount(0), "$0");
    }

    #[test]
    fn expense_json_uses_camel_case() {
        let expense = Expense::confirmed(
            RecordId::confirmed("1").unwrap(),
            DateTime::from_timestamp(0, 0).unwrap(),
            sample_draft(),
        );
        let json = serde_json::to_value(&expense).unwrap();
        assert_eq!(json["id"], "1");
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["charged"], "Ann");
    }
}
