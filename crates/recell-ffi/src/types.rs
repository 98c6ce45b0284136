//! FFI Types - C-compatible type definitions

use std::ffi::{c_char, c_void};

/// Byte buffer for passing state across FFI
#[repr(C)]
pub struct RecellBytes {
    pub data: *mut u8,
    pub len: usize,
    pub capacity: usize,
}

impl RecellBytes {
    /// Create from a `Vec<u8>`, transferring ownership
    pub fn from_vec(v: Vec<u8>) -> Self {
        let mut v = std::mem::ManuallyDrop::new(v);
        Self {
            data: v.as_mut_ptr(),
            len: v.len(),
            capacity: v.capacity(),
        }
    }

    /// The "no state" buffer
    pub fn null() -> Self {
        Self {
            data: std::ptr::null_mut(),
            len: 0,
            capacity: 0,
        }
    }

    pub fn is_null(&self) -> bool {
        self.data.is_null()
    }

    /// Take ownership back.
    ///
    /// # Safety
    /// The buffer must come from [`RecellBytes::from_vec`] (directly or via
    /// `recell_bytes_alloc`) and must not be used again.
    pub unsafe fn into_vec(self) -> Option<Vec<u8>> {
        if self.data.is_null() {
            return None;
        }
        Some(Vec::from_raw_parts(self.data, self.len, self.capacity))
    }
}

/// Produces the next state from the current one.
/// Returning a null buffer means "no state" and is rejected.
pub type RecellReducer =
    Option<extern "C" fn(user_data: *mut c_void, state: *const u8, len: usize) -> RecellBytes>;

/// Projects the state. A null buffer selects the empty projection.
pub type RecellSelector =
    Option<extern "C" fn(user_data: *mut c_void, state: *const u8, len: usize) -> RecellBytes>;

/// Returns true when the selection did not change
pub type RecellComparer = Option<
    extern "C" fn(
        user_data: *mut c_void,
        current: *const u8,
        current_len: usize,
        previous: *const u8,
        previous_len: usize,
    ) -> bool,
>;

/// Receives the selected state
pub type RecellSubscriber =
    Option<extern "C" fn(user_data: *mut c_void, selected: *const u8, len: usize)>;

/// `selector` is part of the subscription
pub const RECELL_USE_SELECTOR: u32 = 1 << 0;
/// `are_equal` is part of the subscription
pub const RECELL_USE_COMPARER: u32 = 1 << 1;

/// Arguments for `recell_cell_subscribe`
#[repr(C)]
pub struct RecellSubscribeOptions {
    pub subscriber: RecellSubscriber,
    pub selector: RecellSelector,
    pub are_equal: RecellComparer,
    /// `RECELL_USE_*` bits; callbacks without their bit are ignored
    pub flags: u32,
    pub user_data: *mut c_void,
    /// Subscriber name for logs, may be NULL
    pub name: *const c_char,
}

/// Take ownership of a buffer returned by a foreign callback
pub(crate) fn take_foreign_bytes(bytes: RecellBytes) -> Option<Vec<u8>> {
    // SAFETY: callbacks must return buffers from recell_bytes_alloc
    unsafe { bytes.into_vec() }
}

/// Opaque pointer handed back to foreign callbacks
#[derive(Clone, Copy)]
pub(crate) struct UserData(pub(crate) *mut c_void);
