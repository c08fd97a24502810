use thiserror::Error;

use crate::form::FormField;

/// Errors produced by type operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid expense form: {}", join_fields(.0))]
    InvalidForm(Vec<FormField>),

    #[error("record id {0:?} is reserved for placeholders")]
    ReservedId(String),

    #[error("unknown color mode: {0:?}")]
    UnknownColorMode(String),
}

fn join_fields(fields: &[FormField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
