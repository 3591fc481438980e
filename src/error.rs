//! Error types.

use thiserror::Error;

/// Failure to build a canonical key from an argument sequence.
///
/// Raised before the wrapped computation is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KeyError {
    /// A floating-point argument was NaN, which is not equal to itself.
    ///
    /// `position` is the index of the offending argument in the sequence.
    #[error("NaN argument at position {position} has no canonical key")]
    NotANumber { position: usize },
    /// A [`Value`][crate::value::Value] list is nested deeper than allowed.
    #[error("argument nesting depth {depth} exceeds the maximum of {max}")]
    TooDeep { depth: usize, max: usize },
}

impl KeyError {
    /// Attributes the error to the argument at `position`.
    pub(crate) fn at(self, position: usize) -> Self {
        match self {
            KeyError::NotANumber { .. } => KeyError::NotANumber { position },
            other => other,
        }
    }
}

/// Failure of a fallible memoized call.
#[derive(Debug, Error)]
pub enum MemoError<E> {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] KeyError),
    /// The wrapped computation failed. Nothing was cached.
    #[error("computation failed: {0}")]
    Computation(#[source] E),
}

impl<E> MemoError<E> {
    /// Returns the computation error, if any.
    pub fn into_computation(self) -> Option<E> {
        match self {
            MemoError::Computation(e) => Some(e),
            MemoError::InvalidArgument(_) => None,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, MemoError::InvalidArgument(_))
    }
}
