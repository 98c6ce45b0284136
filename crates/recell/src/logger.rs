//! Cell-scoped diagnostic logger
//!
//! Called by the cell on every lifecycle action. When logging is disabled
//! every call is a no-op and nothing is formatted.

use std::fmt::Debug;
use std::rc::Rc;

use recell_core::{CellConfig, LogAction, LogMeta, LogRecord, LogSink, SelectedLog, StateLog};

/// Logger bound to one cell for its whole lifetime
pub struct Logger {
    cell: String,
    sink: Option<Rc<dyn LogSink>>,
}

impl Logger {
    pub fn new(config: &CellConfig) -> Self {
        Logger {
            cell: config.display_name().to_string(),
            sink: config.resolve_sink(),
        }
    }

    pub fn cell(&self) -> &str {
        &self.cell
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Write one record
    pub fn log(
        &self,
        action: LogAction,
        current: &dyn Debug,
        previous: &dyn Debug,
        selected: Option<SelectedLog<'_>>,
        subscriber: Option<&str>,
    ) {
        let Some(sink) = &self.sink else {
            return;
        };

        sink.write(&LogRecord {
            cell: &self.cell,
            action,
            state: StateLog {
                current,
                previous,
                selected,
            },
            meta: subscriber.map(|subscriber| LogMeta { subscriber }),
        });
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("cell", &self.cell)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Lines(RefCell<Vec<String>>);

    impl LogSink for Lines {
        fn write(&self, record: &LogRecord<'_>) {
            self.0.borrow_mut().push(record.to_string());
        }
    }

    #[test]
    fn test_disabled_logger_writes_nothing() {
        let lines = Rc::new(Lines::default());
        let mut config = CellConfig::named("quiet");
        config.sink = Some(lines.clone() as Rc<dyn LogSink>);

        let logger = Logger::new(&config);
        logger.log(LogAction::Create, &1, &1, None, None);

        assert!(!logger.is_enabled());
        assert!(lines.0.borrow().is_empty());
    }

    #[test]
    fn test_enabled_logger_formats_meta() {
        let lines = Rc::new(Lines::default());
        let logger = Logger::new(&CellConfig::new().with_sink(lines.clone()));

        logger.log(LogAction::Subscribe, &2, &1, None, Some("view"));

        assert_eq!(logger.cell(), "Unknown");
        assert_eq!(
            lines.0.borrow()[0],
            r#"{ cell: "Unknown", action: subscribe, state: { current: 2, previous: 1 }, meta: { subscriber: "view" } }"#
        );
    }
}
