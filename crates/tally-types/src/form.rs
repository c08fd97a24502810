use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::expense::ExpenseDraft;

/// A field of the add-expense form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormField {
    Origin,
    Amount,
    Charged,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Origin => "origin",
            Self::Amount => "amount",
            Self::Charged => "charged",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw text input of the add-expense form.
///
/// Origin and charged are required, description is free text, and the amount
/// must be a positive decimal number of dollars. Digits past the second
/// fractional place are truncated, so `"12.345"` is 1234 cents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseForm {
    pub origin: String,
    pub description: String,
    pub amount: String,
    pub charged: String,
}

impl ExpenseForm {
    pub fn new(
        origin: impl Into<String>,
        description: impl Into<String>,
        amount: impl Into<String>,
        charged: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            description: description.into(),
            amount: amount.into(),
            charged: charged.into(),
        }
    }

    /// Fields that currently fail validation, in form order.
    pub fn invalid_fields(&self) -> Vec<FormField> {
        let mut invalid = Vec::new();
        if self.origin.trim().is_empty() {
            invalid.push(FormField::Origin);
        }
        if !matches!(parse_amount(&self.amount), Some(cents) if cents > 0) {
            invalid.push(FormField::Amount);
        }
        if self.charged.trim().is_empty() {
            invalid.push(FormField::Charged);
        }
        invalid
    }

    pub fn is_valid(&self) -> bool {
        self.invalid_fields().is_empty()
    }

    /// Validate the form and produce a draft for submission.
    pub fn validate(&self) -> Result<ExpenseDraft, TypeError> {
        let invalid = self.invalid_fields();
        if !invalid.is_empty() {
            return Err(TypeError::InvalidForm(invalid));
        }
        let amount = parse_amount(&self.amount)
            .ok_or_else(|| TypeError::InvalidForm(vec![FormField::Amount]))?;
        Ok(ExpenseDraft {
            origin: self.origin.trim().to_string(),
            description: self.description.clone(),
            amount,
            charged: self.charged.trim().to_string(),
        })
    }
}

/// Parse a dollar amount such as `"12"`, `"12.5"` or `".75"` into cents.
///
/// Returns `None` for empty, signed, or non-numeric input and on overflow.
pub fn parse_amount(input: &str) -> Option<u64> {
    let input = input.trim();
    let (whole, frac) = match input.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (input, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let dollars: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut cents = 0u64;
    for (i, digit) in frac.bytes().take(2).enumerate() {
        let value = u64::from(digit - b'0');
        cents += if i == 0 { value * 10 } else { value };
    }
    dollars.checked_mul(100)?.checked_add(cents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_amount_accepts_decimals() {
        assert_eq!(parse_amount("12"), Some(1200));
        assert_eq!(parse_amount("12.5"), Some(1250));
        assert_eq!(parse_amount("12.34"), Some(1234));
        assert_eq!(parse_amount("12.345"), Some(1234));
        assert_eq!(parse_amount(".75"), Some(75));
        assert_eq!(parse_amount(" 3. "), Some(300));
        assert_eq!(parse_amount("0.29"), Some(29));
    }

    #[test]
    fn parse_amount_rejects_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("."), None);
        assert_eq!(parse_amount("-1"), None);
        assert_eq!(parse_amount("1.2.3"), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("99999999999999999999"), None);
    }

    #[test]
    fn valid_form_produces_trimmed_draft() {
        let form = ExpenseForm::new(" Cafe ", "Latte", "3.20", "Bob ");
        let draft = form.validate().unwrap();
        assert_eq!(draft, ExpenseDraft::new("Cafe", "Latte", 320, "Bob"));
    }

    #[test]
    fn description_may_be_empty() {
        assert!(ExpenseForm::new("Cafe", "", "1", "Bob").is_valid());
    }

    #[test]
    fn invalid_form_lists_every_field() {
        let form = ExpenseForm::new("", "x", "0", "  ");
        assert_eq!(
            form.validate(),
            Err(TypeError::InvalidForm(vec![
                FormField::Origin,
                FormField::Amount,
                FormField::Charged,
            ]))
        );
    }

    #[test]
    fn error_message_names_fields() {
        let err = ExpenseForm::new("", "", "1", "Ann").validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid expense form: origin");
    }

    proptest! {
        #[test]
        fn two_digit_amounts_parse_exactly(dollars in 0u64..1_000_000, cents in 0u64..100) {
            let text = format!("{dollars}.{cents:02}");
            prop_assert_eq!(parse_amount(&text), Some(dollars * 100 + cents));
        }
    }
}
