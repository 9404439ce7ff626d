//! Console logger implementation

use super::traits::{LogLevel, Logger};

/// Environment variable selecting the minimum console level
pub const LOG_LEVEL_ENV: &str = "BREADCRUMBS_LOG_LEVEL";

/// A logger that writes to the console
///
/// Info goes to stdout, everything else to stderr. Lines below the minimum
/// level are dropped.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    prefix: String,
    min_level: LogLevel,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLogger {
    /// Create a console logger with the default prefix at info level
    pub fn new() -> Self {
        Self {
            prefix: "[breadcrumbs]".to_string(),
            min_level: LogLevel::Info,
        }
    }

    /// Create a console logger with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::new()
        }
    }

    /// Set the minimum level
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Apply `BREADCRUMBS_LOG_LEVEL` if it is set to a known level
    pub fn from_env(self) -> Self {
        match std::env::var(LOG_LEVEL_ENV).ok().and_then(|v| LogLevel::parse(&v)) {
            Some(level) => self.with_level(level),
            None => self,
        }
    }

    /// Current minimum level
    pub fn level(&self) -> LogLevel {
        self.min_level
    }

    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    fn format_line(&self, level: LogLevel, message: &str) -> String {
        format!(
            "{} {} {}: {}",
            chrono::Utc::now().format("%H:%M:%S%.3f"),
            self.prefix,
            level,
            message
        )
    }
}

impl Logger for ConsoleLogger {
    fn debug(&self, message: &str) {
        if self.enabled(LogLevel::Debug) {
            eprintln!("{}", self.format_line(LogLevel::Debug, message));
        }
    }

    fn info(&self, message: &str) {
        if self.enabled(LogLevel::Info) {
            println!("{}", self.format_line(LogLevel::Info, message));
        }
    }

    fn warn(&self, message: &str) {
        if self.enabled(LogLevel::Warn) {
            eprintln!("{}", self.format_line(LogLevel::Warn, message));
        }
    }

    fn error(&self, message: &str) {
        if self.enabled(LogLevel::Error) {
            eprintln!("{}", self.format_line(LogLevel::Error, message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_logger_creation() {
        let logger = ConsoleLogger::new();
        assert_eq!(logger.prefix, "[breadcrumbs]");
        assert_eq!(logger.level(), LogLevel::Info);

        let custom = ConsoleLogger::with_prefix("[serve]").with_level(LogLevel::Warn);
        assert_eq!(custom.prefix, "[serve]");
        assert!(!custom.enabled(LogLevel::Info));
        assert!(custom.enabled(LogLevel::Error));
    }

    #[test]
    fn test_format_line_contains_level_and_prefix() {
        let logger = ConsoleLogger::with_prefix("[x]");
        let line = logger.format_line(LogLevel::Warn, "disk full");
        assert!(line.contains("[x] WARN: disk full"));
    }

    #[test]
    fn test_console_logger_logs() {
        let logger = ConsoleLogger::new().with_level(LogLevel::Debug);
        logger.debug("debug message");
        logger.info("info message");
        logger.warn("warn message");
        logger.error("error message");
    }
}
