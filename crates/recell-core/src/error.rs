//! Error types for recell

use std::fmt;

use thiserror::Error;

/// Callable parameter rejected at a dynamic boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Argument {
    Subscriber,
    Selector,
    AreEqual,
    Reducer,
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Argument::Subscriber => "Subscriber must be a function.",
            Argument::Selector => "Selector must be a function.",
            Argument::AreEqual => "Equality comparer must be a function.",
            Argument::Reducer => "Reducer must be a function.",
        };
        f.write_str(msg)
    }
}

/// Core recell errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecellError {
    /// A callable parameter was missing or not callable.
    /// Raised before anything is registered.
    #[error("{0}")]
    InvalidArgument(Argument),

    /// A reducer produced no next state. The cell is left unchanged.
    #[error("State cannot be absent.")]
    InvalidState,
}

impl RecellError {
    /// The offending parameter, if this is an argument error
    pub fn argument(&self) -> Option<Argument> {
        match self {
            RecellError::InvalidArgument(arg) => Some(*arg),
            RecellError::InvalidState => None,
        }
    }
}

/// Result type for recell operations
pub type RecellResult<T> = Result<T, RecellError>;
