//! Recell Core - Contract types shared by every recell crate
//!
//! This crate defines:
//! - The error taxonomy (invalid arguments, invalid state)
//! - Cell configuration and scope-level equality configuration
//! - The diagnostic log record model and log sinks

pub mod config;
pub mod equality;
pub mod error;
pub mod log;

pub use config::*;
pub use equality::*;
pub use error::*;
pub use log::*;
