//! Error/warning counters and the print sink validators report through.
//!
//! Validators never write to the terminal directly. Each finding is one
//! `print` plus one counter increment on a [`DiagnosticSink`].

use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::RwLock;

/// Destination for validator findings.
pub trait DiagnosticSink {
    /// Count one error.
    fn increment_error(&self);

    /// Count one warning.
    fn increment_warning(&self);

    /// Emit one diagnostic line.
    fn print(&self, message: &str);

    /// Count an error and emit its diagnostic.
    fn error(&self, message: &str) {
        self.increment_error();
        self.print(&format!("ERROR: {message}"));
    }

    /// Count a warning and emit its diagnostic.
    fn warning(&self, message: &str) {
        self.increment_warning();
        self.print(&format!("WARNING: {message}"));
    }
}

/// Process-wide style counters plus the ordered diagnostic log.
#[derive(Debug, Default)]
pub struct DiagnosticCounters {
    errors: AtomicU32,
    warnings: AtomicU32,
    messages: RwLock<Vec<String>>,
}

impl DiagnosticCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors counted since the last reset.
    pub fn errors(&self) -> u32 {
        self.errors.load(Ordering::SeqCst)
    }

    /// Warnings counted since the last reset.
    pub fn warnings(&self) -> u32 {
        self.warnings.load(Ordering::SeqCst)
    }

    /// Diagnostics printed since the last reset, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages.read().clone()
    }

    /// Zero both counters and drop the diagnostic log.
    pub fn reset(&self) {
        self.errors.store(0, Ordering::SeqCst);
        self.warnings.store(0, Ordering::SeqCst);
        self.messages.write().clear();
    }
}

impl DiagnosticSink for DiagnosticCounters {
    fn increment_error(&self) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_warning(&self) {
        self.warnings.fetch_add(1, Ordering::SeqCst);
    }

    fn print(&self, message: &str) {
        self.messages.write().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_counts_and_prints_once() {
        let sink = DiagnosticCounters::new();
        sink.error("PPTT Processor ID 4 is not found in the MADT.");

        assert_eq!(sink.errors(), 1);
        assert_eq!(sink.warnings(), 0);
        assert_eq!(
            sink.messages(),
            vec!["ERROR: PPTT Processor ID 4 is not found in the MADT.".to_string()]
        );
    }

    #[test]
    fn test_reset_clears_everything() {
        let sink = DiagnosticCounters::new();
        sink.error("one");
        sink.warning("two");
        sink.print("three");
        assert_eq!(sink.messages().len(), 3);

        sink.reset();
        assert_eq!(sink.errors(), 0);
        assert_eq!(sink.warnings(), 0);
        assert!(sink.messages().is_empty());
    }
}
