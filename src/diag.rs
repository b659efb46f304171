//! Structured diagnostics.
//!
//! Data-quality problems (malformed modifiers, excessive default effects,
//! cleanup statistics) are not errors: the engine keeps going and records
//! them instead. Records accumulate in a [`DiagnosticsSink`] owned by the
//! caller and are mirrored to the `tracing` facade for ordinary log
//! collection.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// How serious a diagnostic record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Statistics and progress notes.
    Info,
    /// Data was skipped or adjusted; results may differ from intent.
    Warning,
    /// A component failed outright.
    Error,
}

/// One diagnostic record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagRecord {
    /// Record severity.
    pub severity: Severity,
    /// Component that emitted the record, e.g. `"generator"`.
    pub component: String,
    /// Human-readable message.
    pub message: String,
}

/// Accumulating diagnostics sink.
///
/// Interior-mutable so read paths (which take `&self` everywhere) can
/// still report data problems they run into.
#[derive(Debug, Default)]
pub struct DiagnosticsSink {
    records: RefCell<Vec<DiagRecord>>,
}

impl DiagnosticsSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an informational message.
    pub fn info(&self, component: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(component, "{message}");
        self.push(Severity::Info, component, message);
    }

    /// Record a warning.
    pub fn warn(&self, component: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(component, "{message}");
        self.push(Severity::Warning, component, message);
    }

    /// Record an error.
    pub fn error(&self, component: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(component, "{message}");
        self.push(Severity::Error, component, message);
    }

    fn push(&self, severity: Severity, component: &str, message: String) {
        self.records.borrow_mut().push(DiagRecord {
            severity,
            component: component.to_owned(),
            message,
        });
    }

    /// Snapshot of every record so far.
    pub fn records(&self) -> Vec<DiagRecord> {
        self.records.borrow().clone()
    }

    /// Snapshot of warning-and-above records.
    pub fn warnings(&self) -> Vec<DiagRecord> {
        self.records
            .borrow()
            .iter()
            .filter(|r| r.severity >= Severity::Warning)
            .cloned()
            .collect()
    }

    /// Discard all records.
    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_accumulates_in_order() {
        let sink = DiagnosticsSink::new();
        sink.info("generator", "1 cleaned");
        sink.warn("registry", "bad filter");
        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].severity, Severity::Info);
        assert_eq!(records[1].component, "registry");
    }

    #[test]
    fn test_warnings_filter() {
        let sink = DiagnosticsSink::new();
        sink.info("generator", "stats");
        sink.warn("generator", "demoted");
        sink.error("builder", "boom");
        let warnings = sink.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|r| r.severity >= Severity::Warning));
    }

    #[test]
    fn test_clear() {
        let sink = DiagnosticsSink::new();
        sink.info("x", "y");
        sink.clear();
        assert!(sink.records().is_empty());
    }
}
