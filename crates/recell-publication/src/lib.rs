//! Recell Publication - the fan-out channel underneath every cell
//!
//! This crate provides:
//! - `Publication<T>`: a named channel, synchronous FIFO delivery
//! - `Unsubscribe`: an idempotent detach handle
//!
//! Everything here is single-threaded. Delivery happens on the caller's
//! stack and completes before `publish` returns.

pub mod channel;
pub mod unsubscribe;

pub use channel::*;
pub use unsubscribe::*;
