//! Log capture for asserting lifecycle records

use std::cell::RefCell;

use recell::{LogAction, LogRecord, LogSink};

/// One lifecycle record with its values rendered through `Debug`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRecord {
    pub cell: String,
    pub action: LogAction,
    pub current: String,
    pub previous: String,
    /// `(current, previous)` selection, notify records only
    pub selected: Option<(String, String)>,
    pub subscriber: Option<String>,
    /// The full record as the default sink would print it
    pub line: String,
}

impl CapturedRecord {
    fn capture(record: &LogRecord<'_>) -> Self {
        CapturedRecord {
            cell: record.cell.to_string(),
            action: record.action,
            current: format!("{:?}", record.state.current),
            previous: format!("{:?}", record.state.previous),
            selected: record
                .state
                .selected
                .map(|s| (format!("{:?}", s.current), format!("{:?}", s.previous))),
            subscriber: record.meta.map(|m| m.subscriber.to_string()),
            line: record.to_string(),
        }
    }
}

/// Sink that keeps every record it receives
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: RefCell<Vec<CapturedRecord>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<CapturedRecord> {
        self.records.borrow().clone()
    }

    /// Actions in the order they were logged
    pub fn actions(&self) -> Vec<LogAction> {
        self.records.borrow().iter().map(|r| r.action).collect()
    }

    /// Records carrying `action`
    pub fn of(&self, action: LogAction) -> Vec<CapturedRecord> {
        self.records
            .borrow()
            .iter()
            .filter(|r| r.action == action)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

impl LogSink for RecordingSink {
    fn write(&self, record: &LogRecord<'_>) {
        self.records.borrow_mut().push(CapturedRecord::capture(record));
    }
}
