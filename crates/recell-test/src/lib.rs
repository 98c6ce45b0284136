//! Recell Test Harness - Probes, recording sinks and invariant fuzzing
//!
//! This crate provides:
//! - Recording subscribers for asserting notification sequences
//! - A log sink that captures every lifecycle record
//! - A seeded fuzzer that checks notification invariants under
//!   random publishes, unsubscribes and re-entrant publishes

pub mod fuzzer;
pub mod probe;
pub mod sink;

pub use fuzzer::*;
pub use probe::*;
pub use sink::*;
