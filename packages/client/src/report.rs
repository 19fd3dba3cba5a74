//! Error reporting seam.
//!
//! The crash-reporting backend is not part of this crate. Failures worth a
//! report are handed to an [`ErrorSink`] as `(category, message, error)`.

use std::sync::Mutex;

/// Receives error reports. Implementations must not block.
pub trait ErrorSink: Send + Sync + 'static {
    fn report(&self, category: &str, message: &str, error: &str);
}

/// Category used for schema validation failures; `message` is the URL.
pub const CATEGORY_VALIDATION: &str = "validation";

/// Category used for session token resolution failures.
pub const CATEGORY_AUTH: &str = "auth";

/// Category used for transport failures with no response.
pub const CATEGORY_TRANSPORT: &str = "transport";

/// Writes every report as a `tracing` warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn report(&self, category: &str, message: &str, error: &str) {
        tracing::warn!(category, error, "{message}");
    }
}

/// Keeps every report in memory. Used by tests and by hosts that show
/// recent failures in a debug panel.
#[derive(Debug, Default)]
pub struct RecordingSink {
    reports: Mutex<Vec<Report>>,
}

/// One recorded report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub category: String,
    pub message: String,
    pub error: String,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }
}

impl ErrorSink for RecordingSink {
    fn report(&self, category: &str, message: &str, error: &str) {
        self.reports.lock().unwrap().push(Report {
            category: category.to_string(),
            message: message.to_string(),
            error: error.to_string(),
        });
    }
}
