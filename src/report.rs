//! Caller-visible channel for non-fatal warnings and errors.

use serde::Serialize;
use std::sync::Mutex;
use tracing::{error, warn};

/// Sink for diagnostics raised while resolving addresses
pub trait Reporter: Send + Sync {
    /// Recoverable problem, e.g. a provider fallback
    fn warning(&self, message: &str);

    /// Unexpected failure; the affected address resolves to nothing
    fn error(&self, message: &str);
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn warning(&self, message: &str) {
        warn!("{}", message);
    }

    fn error(&self, message: &str) {
        error!("{}", message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

/// Keeps diagnostics in memory so a presentation layer can show them later.
///
/// Every message is also logged through `tracing`.
#[derive(Debug, Default)]
pub struct Collector {
    entries: Mutex<Vec<Diagnostic>>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, severity: Severity, message: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push(Diagnostic {
            severity,
            message: message.to_string(),
        });
    }

    /// Snapshot of everything reported so far
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Remove and return everything reported so far
    pub fn drain(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

impl Reporter for Collector {
    fn warning(&self, message: &str) {
        LogReporter.warning(message);
        self.push(Severity::Warning, message);
    }

    fn error(&self, message: &str) {
        LogReporter.error(message);
        self.push(Severity::Error, message);
    }
}
