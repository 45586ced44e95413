/// Structured logging for the potability service
///
/// Provides context-rich logging with component tags, optional subject
/// identifiers (file paths, routes), timestamps, and severity levels.
/// Supports both console output and file-based logging.

use chrono::Utc;
use serde::Deserialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::{Mutex, MutexGuard};

use crate::dataset::DatasetError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(rename = "warn", alias = "warning")]
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    Server,
    Model,
    Dataset,
    Report,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Server => write!(f, "HTTP"),
            Component::Model => write!(f, "MODEL"),
            Component::Dataset => write!(f, "DATA"),
            Component::Report => write!(f, "REPORT"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - optional input simply isn't there
    Expected,
    /// Unexpected failure - input exists but is broken
    Unexpected,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

/// A panic while logging must not silence every later message.
fn global() -> MutexGuard<'static, Option<Logger>> {
    LOGGER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        *global() = Some(logger);
    }

    fn format_entry(level: LogLevel, component: &Component, subject: Option<&str>, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let subject_part = subject.map(|s| format!(" [{}]", s)).unwrap_or_default();
        format!(
            "{} {} {}{}: {}",
            timestamp, level, component, subject_part, message
        )
    }

    fn log(&self, level: LogLevel, component: &Component, subject: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = Self::format_entry(level, component, subject, message);
        let subject_part = subject.map(|s| format!(" [{}]", s)).unwrap_or_default();

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error | LogLevel::Warning => eprintln!("{}", log_entry),
                LogLevel::Info | LogLevel::Debug => println!("{}", log_entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", component, subject_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", component, subject_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}", message),
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

/// Log a general informational message
pub fn info(component: Component, subject: Option<&str>, message: &str) {
    if let Some(logger) = global().as_ref() {
        logger.log(LogLevel::Info, &component, subject, message);
    }
}

/// Log a warning message
pub fn warn(component: Component, subject: Option<&str>, message: &str) {
    if let Some(logger) = global().as_ref() {
        logger.log(LogLevel::Warning, &component, subject, message);
    }
}

/// Log an error message
pub fn error(component: Component, subject: Option<&str>, message: &str) {
    if let Some(logger) = global().as_ref() {
        logger.log(LogLevel::Error, &component, subject, message);
    }
}

/// Log a debug message
pub fn debug(component: Component, subject: Option<&str>, message: &str) {
    if let Some(logger) = global().as_ref() {
        logger.log(LogLevel::Debug, &component, subject, message);
    }
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a dataset failure.
///
/// The averages panel is optional, so an absent CSV is routine. A CSV that
/// is present but unreadable or missing columns points at a broken export.
pub fn classify_dataset_failure(err: &DatasetError) -> FailureType {
    match err {
        DatasetError::NotFound(_) => FailureType::Expected,
        DatasetError::Unreadable { .. }
        | DatasetError::MissingColumn { .. }
        | DatasetError::NoRows(_) => FailureType::Unexpected,
    }
}

/// Log a dataset failure with automatic classification
pub fn log_dataset_failure(path: &str, err: &DatasetError) {
    let failure_type = classify_dataset_failure(err);
    let message = format!("Averages unavailable [{}]: {}", failure_type, err);

    match failure_type {
        FailureType::Expected => warn(Component::Dataset, Some(path), &message),
        FailureType::Unexpected => error(Component::Dataset, Some(path), &message),
    }
}

// ---------------------------------------------------------------------------
// Load Summary Logging
// ---------------------------------------------------------------------------

/// Log how many dataset rows contributed to the averages
pub fn log_dataset_summary(path: &str, total: usize, used: usize, skipped_cells: usize) {
    let message = format!(
        "Averages computed from {}/{} rows, {} cells skipped",
        used, total, skipped_cells
    );

    if skipped_cells == 0 {
        debug(Component::Dataset, Some(path), &message);
    } else if used == 0 {
        error(Component::Dataset, Some(path), &message);
    } else {
        warn(Component::Dataset, Some(path), &message);
    }
}
