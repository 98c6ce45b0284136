#![allow(clippy::missing_safety_doc)]
//! Recell FFI - Foreign Function Interface
//!
//! C-compatible bindings over a cell whose state is a byte buffer.
//! Handles are single-threaded: use each cell from one thread only.

pub mod cell;
pub mod error;
pub mod subscription;
pub mod types;

use std::ffi::c_char;

pub use cell::*;
pub use error::*;
pub use subscription::*;
pub use types::*;

/// Library version
#[no_mangle]
pub extern "C" fn recell_version() -> *const c_char {
    static VERSION: &[u8] = b"0.2.0\0";
    VERSION.as_ptr() as *const c_char
}

/// Copy `len` bytes into a buffer owned by recell.
/// Reducers and selectors must return buffers created this way.
#[no_mangle]
pub unsafe extern "C" fn recell_bytes_alloc(data: *const u8, len: usize) -> RecellBytes {
    match cell::bytes_from_raw(data, len) {
        Some(bytes) => RecellBytes::from_vec(bytes.to_vec()),
        None => RecellBytes::null(),
    }
}

/// Free a byte buffer allocated by recell
#[no_mangle]
pub unsafe extern "C" fn recell_free_bytes(ptr: *mut u8, len: usize, capacity: usize) {
    if !ptr.is_null() {
        drop(Vec::from_raw_parts(ptr, len, capacity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn test_version() {
        let version = unsafe { CStr::from_ptr(recell_version()) };
        assert_eq!(version.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_bytes_alloc() {
        let data = [4u8, 5, 6];
        unsafe {
            let bytes = recell_bytes_alloc(data.as_ptr(), data.len());
            assert_eq!(bytes.len, 3);
            recell_free_bytes(bytes.data, bytes.len, bytes.capacity);

            assert!(recell_bytes_alloc(std::ptr::null(), 2).is_null());
        }
    }
}
