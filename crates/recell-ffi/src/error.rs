//! FFI Error handling

use std::ffi::{c_char, c_int, CString};

use recell::RecellError;
use thiserror::Error;

/// Error codes for FFI functions
#[repr(C)]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecellErrorCode {
    /// Success
    #[error("ok")]
    Ok = 0,
    /// A callback was missing or not callable
    #[error("invalid argument")]
    InvalidArgument = -1,
    /// A reducer produced no state
    #[error("invalid state")]
    InvalidState = -2,
    /// A handle or required pointer was NULL
    #[error("null handle")]
    NullHandle = -3,
}

impl From<RecellErrorCode> for c_int {
    fn from(code: RecellErrorCode) -> Self {
        code as c_int
    }
}

impl From<&RecellError> for RecellErrorCode {
    fn from(err: &RecellError) -> Self {
        match err {
            RecellError::InvalidArgument(_) => RecellErrorCode::InvalidArgument,
            RecellError::InvalidState => RecellErrorCode::InvalidState,
        }
    }
}

thread_local! {
    static LAST_ERROR: std::cell::RefCell<Option<CString>> =
        const { std::cell::RefCell::new(None) };
}

/// Set the last error message
pub fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Record `err` as the last error and return its code
pub fn fail(err: RecellError) -> c_int {
    tracing::debug!(target: "recell::ffi", error = %err, "call rejected");
    set_last_error(&err.to_string());
    RecellErrorCode::from(&err).into()
}

/// Record a NULL handle and return its code
pub fn null_handle(what: &str) -> c_int {
    set_last_error(&format!("Null {what}"));
    RecellErrorCode::NullHandle.into()
}

/// Get the last error message
/// Returns NULL if no error
#[no_mangle]
pub extern "C" fn recell_get_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(s) => s.as_ptr(),
        None => std::ptr::null(),
    })
}

/// Clear the last error
#[no_mangle]
pub extern "C" fn recell_clear_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Message of the last error, for Rust callers
pub fn last_error_message() -> Option<String> {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|s| s.to_string_lossy().into_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use recell::Argument;

    #[test]
    fn test_fail_sets_message_and_code() {
        recell_clear_error();
        let code = fail(RecellError::InvalidArgument(Argument::Selector));

        assert_eq!(code, RecellErrorCode::InvalidArgument as c_int);
        assert_eq!(
            last_error_message().as_deref(),
            Some("Selector must be a function.")
        );
        assert!(!recell_get_last_error().is_null());

        recell_clear_error();
        assert!(recell_get_last_error().is_null());
    }

    #[test]
    fn test_state_error_code() {
        assert_eq!(
            RecellErrorCode::from(&RecellError::InvalidState),
            RecellErrorCode::InvalidState
        );
    }
}
