#![allow(clippy::missing_safety_doc)]
//! FFI Cell functions

use std::ffi::{c_char, c_int, c_void, CStr};
use std::ptr;
use std::slice;

use recell::{Argument, Cell, CellConfig, RecellError};

use crate::error::*;
use crate::types::*;

/// Opaque handle to a cell holding a byte buffer
pub struct RecellCellHandle {
    pub(crate) cell: Cell<Vec<u8>>,
}

/// Borrow `len` bytes at `data`; NULL is only valid for an empty buffer
pub(crate) unsafe fn bytes_from_raw<'a>(data: *const u8, len: usize) -> Option<&'a [u8]> {
    if data.is_null() {
        return (len == 0).then_some(&[][..]);
    }
    Some(slice::from_raw_parts(data, len))
}

/// Read an optional C string
pub(crate) unsafe fn string_from_raw(s: *const c_char) -> Option<String> {
    if s.is_null() {
        return None;
    }
    Some(CStr::from_ptr(s).to_string_lossy().into_owned())
}

/// Create a new cell with a copy of `data` as its initial state.
/// `name` may be NULL. Returns a handle that must be freed with
/// `recell_cell_free`, or NULL on error.
#[no_mangle]
pub unsafe extern "C" fn recell_cell_create(
    data: *const u8,
    len: usize,
    name: *const c_char,
    enable_logging: bool,
) -> *mut RecellCellHandle {
    let Some(initial) = bytes_from_raw(data, len) else {
        set_last_error("Null initial state");
        return ptr::null_mut();
    };

    let config = CellConfig {
        name: string_from_raw(name),
        enable_logging,
        sink: None,
    };
    let handle = Box::new(RecellCellHandle {
        cell: Cell::with_config(initial.to_vec(), config),
    });
    Box::into_raw(handle)
}

/// Free a cell handle.
/// Outstanding subscription handles stay valid; unsubscribing them
/// after the cell is gone does nothing.
#[no_mangle]
pub unsafe extern "C" fn recell_cell_free(handle: *mut RecellCellHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Copy of the current state; free with `recell_free_bytes`
#[no_mangle]
pub unsafe extern "C" fn recell_cell_state(handle: *const RecellCellHandle) -> RecellBytes {
    if handle.is_null() {
        return RecellBytes::null();
    }

    RecellBytes::from_vec((*handle).cell.state().to_vec())
}

/// Number of completed publishes
#[no_mangle]
pub unsafe extern "C" fn recell_cell_version(handle: *const RecellCellHandle) -> u64 {
    if handle.is_null() {
        return 0;
    }

    (*handle).cell.version()
}

/// Number of active subscriptions
#[no_mangle]
pub unsafe extern "C" fn recell_cell_subscriber_count(handle: *const RecellCellHandle) -> usize {
    if handle.is_null() {
        return 0;
    }

    (*handle).cell.subscriber_count()
}

/// Replace the state with whatever `reducer` returns and notify subscribers.
/// A NULL buffer from the reducer leaves the cell unchanged and fails
/// with `InvalidState`.
#[no_mangle]
pub unsafe extern "C" fn recell_cell_publish(
    handle: *const RecellCellHandle,
    reducer: RecellReducer,
    user_data: *mut c_void,
) -> c_int {
    if handle.is_null() {
        return null_handle("handle");
    }
    let Some(reducer) = reducer else {
        return fail(RecellError::InvalidArgument(Argument::Reducer));
    };

    let user_data = UserData(user_data);
    let result = (*handle).cell.try_publish(|state| {
        take_foreign_bytes(reducer(user_data.0, state.as_ptr(), state.len()))
    });

    match result {
        Ok(()) => RecellErrorCode::Ok.into(),
        Err(err) => fail(err),
    }
}
