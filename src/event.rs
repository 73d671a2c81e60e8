//! The log event consumed by the sink.
//!
//! [`LogEvent`] is the sink's input unit: a UTC timestamp plus optional
//! level, logger name, message, exception and a bag of typed properties.
//! Events are assembled with chained `with_*` calls and are immutable once
//! handed to the sink.

use chrono::{DateTime, Utc};

use crate::exception::ExceptionInfo;
use crate::value::Value;

/// Event severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    /// Canonical name stored in the `Level` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "Trace",
            Self::Debug => "Debug",
            Self::Info => "Info",
            Self::Warn => "Warn",
            Self::Error => "Error",
            Self::Fatal => "Fatal",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single structured log event.
#[derive(Debug, Clone)]
pub struct LogEvent {
    timestamp: DateTime<Utc>,
    level: Option<LogLevel>,
    logger: Option<String>,
    message: Option<String>,
    exception: Option<ExceptionInfo>,
    properties: Vec<(String, Value)>,
}

impl LogEvent {
    /// Create an event carrying only a timestamp.
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            level: None,
            logger: None,
            message: None,
            exception: None,
            properties: Vec::new(),
        }
    }

    /// Create an event stamped with the current time.
    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_logger(mut self, logger: impl Into<String>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_exception(mut self, exception: ExceptionInfo) -> Self {
        self.exception = Some(exception);
        self
    }

    /// Append a property. Duplicate names are kept as-is here; the row
    /// builder resolves them last-wins when merging.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }

    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[inline]
    pub fn level(&self) -> Option<LogLevel> {
        self.level
    }

    #[inline]
    pub fn logger(&self) -> Option<&str> {
        self.logger.as_deref()
    }

    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[inline]
    pub fn exception(&self) -> Option<&ExceptionInfo> {
        self.exception.as_ref()
    }

    #[inline]
    pub fn properties(&self) -> &[(String, Value)] {
        &self.properties
    }

    pub fn has_properties(&self) -> bool {
        !self.properties.is_empty()
    }
}
