//! Cell construction configuration

use std::fmt;
use std::rc::Rc;

use crate::log::{LogSink, TracingSink, UNKNOWN_CELL};

/// Configuration for a new cell.
///
/// Fixed at construction: a cell cannot turn logging on or off later.
#[derive(Clone, Default)]
pub struct CellConfig {
    /// Diagnostic identifier
    pub name: Option<String>,
    /// Emit a log record for every lifecycle action
    pub enable_logging: bool,
    /// Where records go; `TracingSink` when unset
    pub sink: Option<Rc<dyn LogSink>>,
}

impl CellConfig {
    pub fn new() -> Self {
        CellConfig::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        CellConfig {
            name: Some(name.into()),
            ..CellConfig::default()
        }
    }

    pub fn with_logging(mut self) -> Self {
        self.enable_logging = true;
        self
    }

    /// Route records to `sink`. Implies logging.
    pub fn with_sink(mut self, sink: Rc<dyn LogSink>) -> Self {
        self.enable_logging = true;
        self.sink = Some(sink);
        self
    }

    /// Name as it appears in log records
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_CELL)
    }

    /// The sink records should go to, or `None` when logging is off
    pub fn resolve_sink(&self) -> Option<Rc<dyn LogSink>> {
        if !self.enable_logging {
            return None;
        }
        Some(
            self.sink
                .clone()
                .unwrap_or_else(|| Rc::new(TracingSink) as Rc<dyn LogSink>),
        )
    }
}

impl fmt::Debug for CellConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellConfig")
            .field("name", &self.name)
            .field("enable_logging", &self.enable_logging)
            .field("custom_sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CellConfig::default();
        assert_eq!(config.display_name(), "Unknown");
        assert!(!config.enable_logging);
        assert!(config.resolve_sink().is_none());
    }

    #[test]
    fn test_named_with_logging() {
        let config = CellConfig::named("profile").with_logging();
        assert_eq!(config.display_name(), "profile");
        assert!(config.resolve_sink().is_some());
    }

    #[test]
    fn test_sink_implies_logging() {
        let config = CellConfig::new().with_sink(Rc::new(TracingSink));
        assert!(config.enable_logging);
    }
}
