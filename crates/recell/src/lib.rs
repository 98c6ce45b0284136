//! Recell - Observable state cell
//!
//! A cell holds one state value and notifies subscribers when the part of
//! the state they select changes:
//! - `publish` applies a reducer and fans the result out
//! - `subscribe` registers a subscriber with a selector and comparator
//! - `state` reads the latest state
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use recell::{Cell, Subscription};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Profile {
//!     name: String,
//!     visits: u32,
//! }
//!
//! let cell = Cell::new(Profile { name: "x".into(), visits: 0 });
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = seen.clone();
//! let unsubscribe = cell.subscribe_with(Subscription::selecting(
//!     |p: &Profile| p.name.clone(),
//!     move |name: &String| sink.borrow_mut().push(name.clone()),
//! ));
//!
//! cell.publish(|p| Profile { visits: p.visits + 1, ..p.clone() });
//! cell.publish(|p| Profile { name: "y".into(), ..p.clone() });
//! unsubscribe.unsubscribe();
//!
//! assert_eq!(*seen.borrow(), ["x", "y"]);
//! ```
//!
//! Cells are single-threaded. All work happens synchronously on the
//! caller's stack.

pub mod cell;
pub mod logger;
pub mod subscription;

pub use cell::*;
pub use subscription::*;

pub use recell_core::{
    AlwaysChanged, Argument, CellConfig, Configuration, EqualityPolicy, LogAction, LogMeta,
    LogRecord, LogSink, RecellError, RecellResult, SelectedLog, StateLog, TracingSink,
    ValueEquality,
};
pub use recell_publication::{Publication, Unsubscribe};
