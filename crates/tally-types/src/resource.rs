use serde::{Deserialize, Serialize};

/// Outcome-in-progress of a single asynchronous operation.
///
/// A resource stream always starts with [`Resource::Pending`] and ends with
/// exactly one terminal value ([`Resource::Fulfilled`] or
/// [`Resource::Rejected`]). Values are immutable; progress is expressed by
/// emitting a new value, never by mutating an old one.
///
/// The placeholder type `P` lets the pending state carry something
/// displayable (for example an optimistic record) while the real value `T`
/// is still in flight. Failures are carried as data in `E` so consumers can
/// observe a rejection without the stream itself faulting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Resource<T, P = (), E = String> {
    /// The operation has started but not settled.
    Pending { placeholder: P },
    /// The operation completed successfully.
    Fulfilled { value: T },
    /// The operation failed.
    Rejected { error: E },
}

impl<T, P, E> Resource<T, P, E> {
    pub fn pending(placeholder: P) -> Self {
        Self::Pending { placeholder }
    }

    pub fn fulfilled(value: T) -> Self {
        Self::Fulfilled { value }
    }

    pub fn rejected(error: E) -> Self {
        Self::Rejected { error }
    }

    /// Build the terminal value for a settled operation.
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Fulfilled { value },
            Err(error) => Self::Rejected { error },
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Returns `true` once the operation has reached a terminal state.
    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    pub fn placeholder(&self) -> Option<&P> {
        match self {
            Self::Pending { placeholder } => Some(placeholder),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Fulfilled { value } => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Rejected { error } => Some(error),
            _ => None,
        }
    }

    /// Transform the fulfilled value, leaving the other states untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resource<U, P, E> {
        match self {
            Self::Pending { placeholder } => Resource::Pending { placeholder },
            Self::Fulfilled { value } => Resource::Fulfilled { value: f(value) },
            Self::Rejected { error } => Resource::Rejected { error },
        }
    }

    /// Transform the pending placeholder.
    pub fn map_placeholder<Q>(self, f: impl FnOnce(P) -> Q) -> Resource<T, Q, E> {
        match self {
            Self::Pending { placeholder } => Resource::Pending {
                placeholder: f(placeholder),
            },
            Self::Fulfilled { value } => Resource::Fulfilled { value },
            Self::Rejected { error } => Resource::Rejected { error },
        }
    }

    /// Transform the rejection error.
    pub fn map_err<F>(self, f: impl FnOnce(E) -> F) -> Resource<T, P, F> {
        match self {
            Self::Pending { placeholder } => Resource::Pending { placeholder },
            Self::Fulfilled { value } => Resource::Fulfilled { value },
            Self::Rejected { error } => Resource::Rejected { error: f(error) },
        }
    }

    /// Convert a terminal resource back into a `Result`.
    ///
    /// Returns `None` while still pending.
    pub fn into_result(self) -> Option<Result<T, E>> {
        match self {
            Self::Pending { .. } => None,
            Self::Fulfilled { value } => Some(Ok(value)),
            Self::Rejected { error } => Some(Err(error)),
        }
    }
}
