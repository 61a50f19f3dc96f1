//! Leveled pipeline logging.
//!
//! The pipeline reports progress through four levels. Entries are emitted as
//! `tracing` events so the CLI decides where they go (stderr by default).

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log level of a pipeline message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth, rendered as leading spaces
    pub indent: u8,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self { level, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Message with indentation applied
    pub fn render(&self) -> String {
        format!("{}{}", "   ".repeat(self.indent as usize), self.message)
    }

    pub fn emit(&self) {
        let text = self.render();
        match self.level {
            LogLevel::Info => tracing::info!("{}", text),
            LogLevel::Success => tracing::info!(status = "ok", "{}", text),
            LogLevel::Warning => tracing::warn!("{}", text),
            LogLevel::Error => tracing::error!("{}", text),
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose { "off_to_mf=debug" } else { "off_to_mf=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // try_init: a second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

pub fn log_info(msg: impl Into<String>) {
    LogEntry::new(LogLevel::Info, msg).emit();
}

pub fn log_success(msg: impl Into<String>) {
    LogEntry::new(LogLevel::Success, msg).emit();
}

pub fn log_warning(msg: impl Into<String>) {
    LogEntry::new(LogLevel::Warning, msg).emit();
}

pub fn log_error(msg: impl Into<String>) {
    LogEntry::new(LogLevel::Error, msg).emit();
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LogEntry::new(LogLevel::Info, msg).with_indent(indent).emit();
}
