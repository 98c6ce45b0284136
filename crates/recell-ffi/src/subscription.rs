#![allow(clippy::missing_safety_doc)]
//! FFI Subscription functions
//!
//! Foreign callbacks arrive as nullable function pointers, so this is the
//! one place where "is this callable" has to be checked at runtime.

use std::ffi::{c_int, c_void};
use std::ptr;

use recell::{Argument, RecellError, RecellResult, Subscription, Unsubscribe};

use crate::cell::{string_from_raw, RecellCellHandle};
use crate::error::*;
use crate::types::*;

/// Opaque handle to one subscription
pub struct RecellSubscriptionHandle {
    pub(crate) unsubscribe: Unsubscribe,
}

type SubscriberFn = extern "C" fn(*mut c_void, *const u8, usize);
type SelectorFn = extern "C" fn(*mut c_void, *const u8, usize) -> RecellBytes;
type ComparerFn = extern "C" fn(*mut c_void, *const u8, usize, *const u8, usize) -> bool;

/// Callbacks that passed validation
#[derive(Clone, Copy)]
pub(crate) struct Callbacks {
    subscriber: SubscriberFn,
    selector: Option<SelectorFn>,
    are_equal: Option<ComparerFn>,
}

/// Check every requested callback before anything is registered
pub(crate) fn validate(options: &RecellSubscribeOptions) -> RecellResult<Callbacks> {
    let subscriber = options
        .subscriber
        .ok_or(RecellError::InvalidArgument(Argument::Subscriber))?;

    let selector = if options.flags & RECELL_USE_SELECTOR != 0 {
        Some(
            options
                .selector
                .ok_or(RecellError::InvalidArgument(Argument::Selector))?,
        )
    } else {
        None
    };

    let are_equal = if options.flags & RECELL_USE_COMPARER != 0 {
        Some(
            options
                .are_equal
                .ok_or(RecellError::InvalidArgument(Argument::AreEqual))?,
        )
    } else {
        None
    };

    Ok(Callbacks {
        subscriber,
        selector,
        are_equal,
    })
}

fn build(callbacks: Callbacks, user_data: UserData) -> Subscription<Vec<u8>, Vec<u8>> {
    let selector = move |state: &Vec<u8>| match callbacks.selector {
        Some(select) => {
            take_foreign_bytes(select(user_data.0, state.as_ptr(), state.len())).unwrap_or_default()
        }
        None => state.clone(),
    };
    let are_equal = move |current: &Vec<u8>, previous: &Vec<u8>| match callbacks.are_equal {
        Some(compare) => compare(
            user_data.0,
            current.as_ptr(),
            current.len(),
            previous.as_ptr(),
            previous.len(),
        ),
        None => current == previous,
    };
    let subscriber = move |selected: &Vec<u8>| {
        (callbacks.subscriber)(user_data.0, selected.as_ptr(), selected.len());
    };

    Subscription::comparing(selector, are_equal, subscriber)
}

/// Subscribe to a cell.
///
/// The subscriber is called once with the current selection before this
/// returns. On success `*out` receives a handle that must be freed with
/// `recell_subscription_free`. On failure nothing is registered.
#[no_mangle]
pub unsafe extern "C" fn recell_cell_subscribe(
    handle: *const RecellCellHandle,
    options: *const RecellSubscribeOptions,
    out: *mut *mut RecellSubscriptionHandle,
) -> c_int {
    if handle.is_null() {
        return null_handle("handle");
    }
    if options.is_null() {
        return null_handle("options");
    }
    if out.is_null() {
        return null_handle("output pointer");
    }
    *out = ptr::null_mut();

    let options = &*options;
    let callbacks = match validate(options) {
        Ok(callbacks) => callbacks,
        Err(err) => return fail(err),
    };

    let mut subscription = build(callbacks, UserData(options.user_data));
    if let Some(name) = string_from_raw(options.name) {
        subscription = subscription.named(name);
    }

    let unsubscribe = (*handle).cell.subscribe_with(subscription);
    *out = Box::into_raw(Box::new(RecellSubscriptionHandle { unsubscribe }));

    RecellErrorCode::Ok.into()
}

/// Detach a subscription. Calling it again does nothing.
#[no_mangle]
pub unsafe extern "C" fn recell_subscription_unsubscribe(
    handle: *const RecellSubscriptionHandle,
) -> c_int {
    if handle.is_null() {
        return null_handle("subscription");
    }

    (*handle).unsubscribe.unsubscribe();
    RecellErrorCode::Ok.into()
}

/// True until the subscription has been detached
#[no_mangle]
pub unsafe extern "C" fn recell_subscription_is_active(
    handle: *const RecellSubscriptionHandle,
) -> bool {
    if handle.is_null() {
        return false;
    }

    (*handle).unsubscribe.is_active()
}

/// Free a subscription handle. Does not unsubscribe.
#[no_mangle]
pub unsafe extern "C" fn recell_subscription_free(handle: *mut RecellSubscriptionHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::*;
    use std::cell::RefCell;
    use std::slice;

    /// Collected calls, reached through `user_data`
    type Calls = RefCell<Vec<Vec<u8>>>;

    extern "C" fn record(user_data: *mut c_void, selected: *const u8, len: usize) {
        let calls = unsafe { &*(user_data as *const Calls) };
        let selected = unsafe { slice::from_raw_parts(selected, len) };
        calls.borrow_mut().push(selected.to_vec());
    }

    extern "C" fn first_byte(_: *mut c_void, state: *const u8, len: usize) -> RecellBytes {
        let state = unsafe { slice::from_raw_parts(state, len) };
        RecellBytes::from_vec(state.iter().take(1).copied().collect())
    }

    extern "C" fn same_length(
        _: *mut c_void,
        _: *const u8,
        current_len: usize,
        _: *const u8,
        previous_len: usize,
    ) -> bool {
        current_len == previous_len
    }

    extern "C" fn set_second(_: *mut c_void, state: *const u8, len: usize) -> RecellBytes {
        let mut next = unsafe { slice::from_raw_parts(state, len) }.to_vec();
        next[1] = next[1].wrapping_add(1);
        RecellBytes::from_vec(next)
    }

    extern "C" fn set_first(_: *mut c_void, state: *const u8, len: usize) -> RecellBytes {
        let mut next = unsafe { slice::from_raw_parts(state, len) }.to_vec();
        next[0] = next[0].wrapping_add(1);
        RecellBytes::from_vec(next)
    }

    extern "C" fn grow(_: *mut c_void, state: *const u8, len: usize) -> RecellBytes {
        let mut next = unsafe { slice::from_raw_parts(state, len) }.to_vec();
        next.push(0);
        RecellBytes::from_vec(next)
    }

    fn options(calls: &Calls) -> RecellSubscribeOptions {
        RecellSubscribeOptions {
            subscriber: Some(record),
            selector: None,
            are_equal: None,
            flags: 0,
            user_data: calls as *const Calls as *mut c_void,
            name: ptr::null(),
        }
    }

    #[test]
    fn test_subscribe_whole_state() {
        unsafe {
            let cell = recell_cell_create([1u8, 2].as_ptr(), 2, ptr::null(), false);
            let calls = Calls::default();
            let mut sub = ptr::null_mut();

            let code = recell_cell_subscribe(cell, &options(&calls), &mut sub);
            assert_eq!(code, 0);
            assert_eq!(*calls.borrow(), vec![vec![1, 2]]);

            recell_cell_publish(cell, Some(set_second), ptr::null_mut());
            assert_eq!(*calls.borrow(), vec![vec![1, 2], vec![1, 3]]);

            recell_subscription_unsubscribe(sub);
            recell_subscription_unsubscribe(sub);
            assert!(!recell_subscription_is_active(sub));
            recell_cell_publish(cell, Some(set_second), ptr::null_mut());
            assert_eq!(calls.borrow().len(), 2);

            recell_subscription_free(sub);
            recell_cell_free(cell);
        }
    }

    #[test]
    fn test_selector_filters_notifications() {
        unsafe {
            let cell = recell_cell_create([1u8, 2].as_ptr(), 2, ptr::null(), false);
            let calls = Calls::default();
            let mut opts = options(&calls);
            opts.selector = Some(first_byte);
            opts.flags = RECELL_USE_SELECTOR;
            let mut sub = ptr::null_mut();

            assert_eq!(recell_cell_subscribe(cell, &opts, &mut sub), 0);
            recell_cell_publish(cell, Some(set_second), ptr::null_mut());
            recell_cell_publish(cell, Some(set_first), ptr::null_mut());

            assert_eq!(*calls.borrow(), vec![vec![1], vec![2]]);

            recell_subscription_free(sub);
            recell_cell_free(cell);
        }
    }

    #[test]
    fn test_comparer_filters_notifications() {
        unsafe {
            let cell = recell_cell_create([1u8, 2].as_ptr(), 2, ptr::null(), false);
            let calls = Calls::default();
            let mut opts = options(&calls);
            opts.are_equal = Some(same_length);
            opts.flags = RECELL_USE_COMPARER;
            let mut sub = ptr::null_mut();

            assert_eq!(recell_cell_subscribe(cell, &opts, &mut sub), 0);
            recell_cell_publish(cell, Some(set_first), ptr::null_mut());
            recell_cell_publish(cell, Some(grow), ptr::null_mut());

            assert_eq!(*calls.borrow(), vec![vec![1, 2], vec![2, 2, 0]]);

            recell_subscription_free(sub);
            recell_cell_free(cell);
        }
    }

    #[test]
    fn test_invalid_callbacks_register_nothing() {
        unsafe {
            let cell = recell_cell_create([0u8].as_ptr(), 1, ptr::null(), false);
            let calls = Calls::default();
            let mut keep = ptr::null_mut();
            assert_eq!(recell_cell_subscribe(cell, &options(&calls), &mut keep), 0);

            let cases = [
                (
                    RecellSubscribeOptions {
                        subscriber: None,
                        ..options(&calls)
                    },
                    "Subscriber must be a function.",
                ),
                (
                    RecellSubscribeOptions {
                        flags: RECELL_USE_SELECTOR,
                        ..options(&calls)
                    },
                    "Selector must be a function.",
                ),
                (
                    RecellSubscribeOptions {
                        flags: RECELL_USE_SELECTOR | RECELL_USE_COMPARER,
                        selector: Some(first_byte),
                        ..options(&calls)
                    },
                    "Equality comparer must be a function.",
                ),
            ];

            for (opts, message) in cases {
                let mut sub = ptr::null_mut();
                let code = recell_cell_subscribe(cell, &opts, &mut sub);

                assert_eq!(code, RecellErrorCode::InvalidArgument as c_int);
                assert_eq!(last_error_message().as_deref(), Some(message));
                assert!(sub.is_null());
                assert_eq!(recell_cell_subscriber_count(cell), 1);
            }

            // The surviving subscription still works
            recell_cell_publish(cell, Some(set_first), ptr::null_mut());
            assert_eq!(*calls.borrow(), vec![vec![0], vec![1]]);

            recell_subscription_free(keep);
            recell_cell_free(cell);
        }
    }

    #[test]
    fn test_unsubscribe_after_cell_freed() {
        unsafe {
            let cell = recell_cell_create(ptr::null(), 0, ptr::null(), false);
            let calls = Calls::default();
            let mut sub = ptr::null_mut();
            recell_cell_subscribe(cell, &options(&calls), &mut sub);

            recell_cell_free(cell);

            assert_eq!(recell_subscription_unsubscribe(sub), 0);
            recell_subscription_free(sub);
        }
    }
}
