//! Tracing and logging setup shared by the service binaries.

/// Initialize process-wide tracing with the given settings.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(settings: &LogSettings) {
    tracing::init(settings);
}

/// Tracing configuration (filters, formatters).
pub mod tracing;

pub use tracing::{LogFormat, LogSettings, ParseLogFormatError};
