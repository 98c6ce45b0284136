//! Diagnostic log records
//!
//! A cell with logging enabled emits one [`LogRecord`] per lifecycle action
//! to its [`LogSink`]. Records borrow the state they describe; sinks that
//! need to keep them must render them first.

use std::fmt;

/// Cell name used when none was configured
pub const UNKNOWN_CELL: &str = "Unknown";

/// Subscriber name used when none was given
pub const ANONYMOUS_SUBSCRIBER: &str = "anonymous";

/// Lifecycle action being logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogAction {
    Create,
    Publish,
    Subscribe,
    Unsubscribe,
    Notify,
}

impl LogAction {
    pub fn as_str(self) -> &'static str {
        match self {
            LogAction::Create => "create",
            LogAction::Publish => "publish",
            LogAction::Subscribe => "subscribe",
            LogAction::Unsubscribe => "unsubscribe",
            LogAction::Notify => "notify",
        }
    }
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selected state seen by a subscription
#[derive(Debug, Clone, Copy)]
pub struct SelectedLog<'a> {
    pub current: &'a dyn fmt::Debug,
    pub previous: &'a dyn fmt::Debug,
}

/// Cell state at the time of the action
#[derive(Debug, Clone, Copy)]
pub struct StateLog<'a> {
    pub current: &'a dyn fmt::Debug,
    pub previous: &'a dyn fmt::Debug,
    pub selected: Option<SelectedLog<'a>>,
}

/// Metadata attached to subscription-related actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogMeta<'a> {
    pub subscriber: &'a str,
}

/// One diagnostic record
#[derive(Debug, Clone, Copy)]
pub struct LogRecord<'a> {
    pub cell: &'a str,
    pub action: LogAction,
    pub state: StateLog<'a>,
    pub meta: Option<LogMeta<'a>>,
}

impl fmt::Display for LogRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ cell: {:?}, action: {}, state: {{ current: {:?}, previous: {:?}",
            self.cell, self.action, self.state.current, self.state.previous
        )?;
        if let Some(selected) = &self.state.selected {
            write!(
                f,
                ", selected: {{ current: {:?}, previous: {:?} }}",
                selected.current, selected.previous
            )?;
        }
        f.write_str(" }")?;
        if let Some(meta) = &self.meta {
            write!(f, ", meta: {{ subscriber: {:?} }}", meta.subscriber)?;
        }
        f.write_str(" }")
    }
}

/// Destination for diagnostic records.
///
/// Sinks are side-effect only: they return nothing and must not panic.
pub trait LogSink {
    fn write(&self, record: &LogRecord<'_>);
}

/// Default sink: one DEBUG event per record on the `recell` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, record: &LogRecord<'_>) {
        tracing::debug!(
            target: "recell",
            cell = record.cell,
            action = record.action.as_str(),
            "{}",
            record
        );
    }
}
