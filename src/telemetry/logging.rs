//! Logging
//!
//! Diagnostics sink for direct authentication operations. Messages never
//! carry secrets: passwords, OTPs, binding codes and tokens stay out of them.

use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt;
use std::sync::Mutex;

/// Log target used by [`TracingLogger`].
pub const LOG_TARGET: &str = "direct_auth";

/// Severity of a log message, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Per-request detail such as poll attempts.
    Trace,
    /// Step requests and state transitions.
    Debug,
    /// Lifecycle events such as cancellation.
    Info,
    /// HTTP errors returned by the server and polling expiry.
    Warn,
    /// Internal failures: transport, decoding, protocol violations.
    Error,
}

impl LogLevel {
    /// Upper-case level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logger interface.
pub trait Logger: Send + Sync {
    /// Write a message with an optional error.
    fn write(&self, message: &str, error: Option<&(dyn Error + 'static)>, level: LogLevel);

    /// Check if a log level is enabled.
    fn is_enabled(&self, _level: LogLevel) -> bool {
        true
    }

    /// Log at trace level.
    fn trace(&self, message: &str) {
        self.write(message, None, LogLevel::Trace);
    }

    /// Log at debug level.
    fn debug(&self, message: &str) {
        self.write(message, None, LogLevel::Debug);
    }

    /// Log at info level.
    fn info(&self, message: &str) {
        self.write(message, None, LogLevel::Info);
    }

    /// Log at warn level.
    fn warn(&self, message: &str) {
        self.write(message, None, LogLevel::Warn);
    }

    /// Log at error level with an optional source error.
    fn error(&self, message: &str, error: Option<&(dyn Error + 'static)>) {
        self.write(message, error, LogLevel::Error);
    }
}

/// Discards everything.
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn write(&self, _message: &str, _error: Option<&(dyn Error + 'static)>, _level: LogLevel) {}

    fn is_enabled(&self, _level: LogLevel) -> bool {
        false
    }
}

/// Forwards to `tracing` under [`LOG_TARGET`], the error as an `error` field.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn write(&self, message: &str, error: Option<&(dyn Error + 'static)>, level: LogLevel) {
        let error = error.map(|e| e.to_string());
        let error = error.as_deref().unwrap_or("");
        match level {
            LogLevel::Trace => tracing::trace!(target: LOG_TARGET, error, "{}", message),
            LogLevel::Debug => tracing::debug!(target: LOG_TARGET, error, "{}", message),
            LogLevel::Info => tracing::info!(target: LOG_TARGET, error, "{}", message),
            LogLevel::Warn => tracing::warn!(target: LOG_TARGET, error, "{}", message),
            LogLevel::Error => tracing::error!(target: LOG_TARGET, error, "{}", message),
        }
    }

    fn is_enabled(&self, level: LogLevel) -> bool {
        match level {
            LogLevel::Trace => tracing::enabled!(target: LOG_TARGET, tracing::Level::TRACE),
            LogLevel::Debug => tracing::enabled!(target: LOG_TARGET, tracing::Level::DEBUG),
            LogLevel::Info => tracing::enabled!(target: LOG_TARGET, tracing::Level::INFO),
            LogLevel::Warn => tracing::enabled!(target: LOG_TARGET, tracing::Level::WARN),
            LogLevel::Error => tracing::enabled!(target: LOG_TARGET, tracing::Level::ERROR),
        }
    }
}

/// A recorded log line.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Rendered error, if one was attached.
    pub error: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Recording logger for tests.
pub struct InMemoryLogger {
    entries: Mutex<Vec<LogEntry>>,
    min_level: LogLevel,
}

impl InMemoryLogger {
    /// Record every level.
    pub fn new() -> Self {
        Self::with_level(LogLevel::Trace)
    }

    /// Record `min_level` and above.
    pub fn with_level(min_level: LogLevel) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            min_level,
        }
    }

    /// All recorded entries, oldest first.
    pub fn get_entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Entries recorded at exactly `level`.
    pub fn get_entries_by_level(&self, level: LogLevel) -> Vec<LogEntry> {
        self.get_entries()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }

    /// Recorded messages, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.get_entries().into_iter().map(|e| e.message).collect()
    }

    /// Drop every recorded entry.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

impl Default for InMemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for InMemoryLogger {
    fn write(&self, message: &str, error: Option<&(dyn Error + 'static)>, level: LogLevel) {
        if !self.is_enabled(level) {
            return;
        }
        self.entries.lock().unwrap().push(LogEntry {
            level,
            message: message.to_string(),
            error: error.map(|e| e.to_string()),
            recorded_at: Utc::now(),
        });
    }

    fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }
}

/// Create in-memory logger for testing.
pub fn create_in_memory_logger() -> InMemoryLogger {
    InMemoryLogger::new()
}

/// Create the default `tracing`-backed logger.
pub fn create_tracing_logger() -> TracingLogger {
    TracingLogger
}
