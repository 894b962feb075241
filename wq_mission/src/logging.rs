//! Structured logging for the water-quality mission service
//!
//! Provides context-rich logging tagged with the component that emitted
//! the line and an optional subject (a mission id, a zone id), with UTC
//! timestamps and severity levels. Supports both console output and
//! file-based logging.
//!
//! Nothing is printed until `init_logger` has been called, so library
//! callers that never configure logging get silence.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::model::WaterQualityRecord;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
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

impl LogLevel {
    /// Parses a level name as written in the config file. Case-insensitive;
    /// accepts both `warn` and `warning`.
    pub fn from_name(name: &str) -> Option<LogLevel> {
        match name.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    Record,
    IdGen,
    Config,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Record => write!(f, "RECORD"),
            Component::IdGen => write!(f, "IDGEN"),
            Component::Config => write!(f, "CONFIG"),
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

impl Logger {
    fn new(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) -> Self {
        Logger {
            min_level,
            log_file,
            console_timestamps,
        }
    }

    fn format_entry(level: LogLevel, component: &Component, subject: Option<&str>, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let subject_part = subject.map(|s| format!(" [{}]", s)).unwrap_or_default();
        format!("{} {} {}{}: {}", timestamp, level, component, subject_part, message)
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
                LogLevel::Debug => println!("   [DEBUG] {}{}: {}", component, subject_part, message),
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

fn with_logger(level: LogLevel, component: Component, subject: Option<&str>, message: &str) {
    // A poisoned lock only means another thread panicked mid-log; keep logging.
    let guard = LOGGER.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(logger) = guard.as_ref() {
        logger.log(level, &component, subject, message);
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize (or replace) the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    let logger = Logger::new(min_level, log_file.map(String::from), console_timestamps);
    *LOGGER.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(logger);
}

/// Log a general informational message
pub fn info(component: Component, subject: Option<&str>, message: &str) {
    with_logger(LogLevel::Info, component, subject, message);
}

/// Log a warning message
pub fn warn(component: Component, subject: Option<&str>, message: &str) {
    with_logger(LogLevel::Warning, component, subject, message);
}

/// Log an error message
pub fn error(component: Component, subject: Option<&str>, message: &str) {
    with_logger(LogLevel::Error, component, subject, message);
}

/// Log a debug message
pub fn debug(component: Component, subject: Option<&str>, message: &str) {
    with_logger(LogLevel::Debug, component, subject, message);
}

// ---------------------------------------------------------------------------
// Record Summary Logging
// ---------------------------------------------------------------------------

/// Picks the level for a record summary: nothing missing is routine,
/// everything missing is suspicious, anything in between is worth noting.
pub fn summary_level(absent: usize, total: usize) -> LogLevel {
    if absent == 0 {
        LogLevel::Debug
    } else if absent == total {
        LogLevel::Warning
    } else {
        LogLevel::Info
    }
}

/// Log how complete a freshly built record is
pub fn log_record_summary(record: &WaterQualityRecord) {
    let total = WaterQualityRecord::field_count();
    let absent = record.absent_fields().len();
    let message = format!(
        "Record built: {}/{} fields present, {} absent",
        total - absent,
        total,
        absent
    );

    with_logger(
        summary_level(absent, total),
        Component::Record,
        record.mission_idx.as_deref(),
        &message,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_from_name() {
        assert_eq!(LogLevel::from_name("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_name(" info "), Some(LogLevel::Info));
        assert_eq!(LogLevel::from_name("warn"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::from_name("Warning"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::from_name("error"), Some(LogLevel::Error));
        assert_eq!(LogLevel::from_name("verbose"), None);
    }

    #[test]
    fn test_summary_level() {
        assert_eq!(summary_level(0, 26), LogLevel::Debug);
        assert_eq!(summary_level(5, 26), LogLevel::Info);
        assert_eq!(summary_level(26, 26), LogLevel::Warning);
    }

    #[test]
    fn test_entry_includes_component_and_subject() {
        let entry = Logger::format_entry(LogLevel::Info, &Component::IdGen, Some("MISSION_20240501_0001"), "issued");
        assert!(entry.contains("INFO IDGEN [MISSION_20240501_0001]: issued"));
        assert!(entry.ends_with("issued"));

        let bare = Logger::format_entry(LogLevel::Error, &Component::Config, None, "bad level");
        assert!(bare.contains("ERROR CONFIG: bad level"));
    }
}
