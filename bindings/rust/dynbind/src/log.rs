//! Logging interface for dynbind
//!
//! Every diagnostic the bindings produce (library load attempts, the
//! extension lookup strategy picked for OpenCL, entry points that a driver
//! advertises but does not export, LibOVR runtime messages) goes through
//! [`log_emit`]. When a handler is installed it receives the message;
//! otherwise the message is forwarded to [`tracing`] under the `dynbind`
//! target. The handler is process-wide and thread-safe.
//!
//! # Example
//!
//! ```no_run
//! use dynbind::{LogLevel, set_log_handler, clear_log_handler, log_emit};
//!
//! set_log_handler(|level, msg| {
//!     eprintln!("[{:?}] {}", level, msg);
//! });
//!
//! log_emit(LogLevel::Info, "bindings initialized");
//!
//! clear_log_handler();
//! ```

use std::sync::Mutex;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Error condition
    Error,
    /// Warning condition
    Warning,
    /// Informational
    Info,
    /// Debug-level
    Debug,
}

impl LogLevel {
    /// Short name for the log level ("ERR", "WARN", etc.)
    pub fn name(self) -> &'static str {
        match self {
            LogLevel::Error => "ERR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

type Handler = Box<dyn Fn(LogLevel, &str) + Send + 'static>;

/// Process-wide handler storage
static LOG_HANDLER: Mutex<Option<Handler>> = Mutex::new(None);

/// Install a process-wide log handler.
///
/// Replaces any previously installed handler. The handler is called from
/// whichever thread emits the log message; it must be thread-safe.
///
/// # Example
///
/// ```no_run
/// dynbind::set_log_handler(|level, msg| {
///     eprintln!("[{}] {}", level, msg);
/// });
/// ```
pub fn set_log_handler<F>(handler: F)
where
    F: Fn(LogLevel, &str) + Send + 'static,
{
    let mut guard = LOG_HANDLER.lock().unwrap_or_else(|e| e.into_inner());
    *guard = Some(Box::new(handler));
}

/// Remove the current log handler.
///
/// Messages go back to `tracing` afterwards.
pub fn clear_log_handler() {
    let mut guard = LOG_HANDLER.lock().unwrap_or_else(|e| e.into_inner());
    *guard = None;
}

/// Emit a log message through the registered handler, or through `tracing`
/// when none is installed. Thread-safe.
pub fn log_emit(level: LogLevel, msg: &str) {
    let guard = LOG_HANDLER.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(handler) = guard.as_ref() {
        // A panicking handler must not poison the pipeline for everyone else
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            handler(level, msg);
        }));
        return;
    }
    drop(guard);

    match level {
        LogLevel::Error => tracing::error!(target: "dynbind", "{}", msg),
        LogLevel::Warning => tracing::warn!(target: "dynbind", "{}", msg),
        LogLevel::Info => tracing::info!(target: "dynbind", "{}", msg),
        LogLevel::Debug => tracing::debug!(target: "dynbind", "{}", msg),
    }
}

/// Serializes tests that mutate the process-wide log handler.
/// Rust runs tests in parallel by default; without this guard,
/// concurrent set/clear calls corrupt each other's handler state.
#[cfg(test)]
pub(crate) static LOG_TEST_LOCK: Mutex<()> = Mutex::new(());
