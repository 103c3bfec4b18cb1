//! Telemetry
//!
//! Observability components for direct authentication.

pub mod logging;

pub use logging::{
    create_in_memory_logger, create_tracing_logger, InMemoryLogger, LogEntry, LogLevel, Logger,
    NoOpLogger, TracingLogger,
};
