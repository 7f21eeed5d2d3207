//! Глобальный pluggable logger.
//!
//! Хост (игровой движок, тестовый harness) ставит свой [`LogPrinter`];
//! по умолчанию — [`ConsoleLogger`] через [`init_logger`]. Сообщения ниже
//! порога [`set_log_level`] отбрасываются до форматирования timestamp'а.

use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;

// Потокобезопасный глобальный logger (один на процесс, как и stdout)
static LOGGER: Lazy<Mutex<Option<Box<dyn LogPrinter>>>> = Lazy::new(|| Mutex::new(None));

static LOGGER_LEVEL: Lazy<Mutex<LogLevel>> = Lazy::new(|| Mutex::new(LogLevel::Debug));

/// Poisoned mutex не роняет симуляцию — лог продолжает работать
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

pub trait LogPrinter: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

pub fn set_logger(logger: Box<dyn LogPrinter>) {
    *lock(&LOGGER) = Some(logger);
}

pub fn set_logger_if_needed(logger: Box<dyn LogPrinter>) {
    let mut slot = lock(&LOGGER);
    if slot.is_none() {
        *slot = Some(logger);
    }
}

pub fn set_log_level(level: LogLevel) {
    *lock(&LOGGER_LEVEL) = level;
}

pub fn log_level() -> LogLevel {
    *lock(&LOGGER_LEVEL)
}

pub fn log(message: &str) {
    log_with_level(LogLevel::Debug, message);
}

pub fn log_info(message: &str) {
    log_with_level(LogLevel::Info, message);
}

pub fn log_warning(message: &str) {
    log_with_level(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    log_with_level(LogLevel::Error, message);
}

pub fn log_with_level(level: LogLevel, message: &str) {
    if level < log_level() {
        return;
    }

    if let Some(logger) = lock(&LOGGER).as_ref() {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        logger.log(level, &format!("[{}] {}", timestamp, message));
    }
}

pub struct ConsoleLogger;

impl LogPrinter for ConsoleLogger {
    fn log(&self, level: LogLevel, message: &str) {
        println!("[{}] {}", level.as_str(), message);
    }
}

pub fn init_logger() {
    set_logger_if_needed(Box::new(ConsoleLogger));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert_eq!(LogLevel::Warning.as_str(), "WARNING");
    }

    struct CapturePrinter(std::sync::Arc<Mutex<Vec<String>>>);

    impl LogPrinter for CapturePrinter {
        fn log(&self, _level: LogLevel, message: &str) {
            lock(&self.0).push(message.to_string());
        }
    }

    #[test]
    fn test_messages_below_threshold_dropped() {
        let captured = std::sync::Arc::new(Mutex::new(Vec::new()));
        set_logger(Box::new(CapturePrinter(captured.clone())));
        set_log_level(LogLevel::Warning);
        assert_eq!(log_level(), LogLevel::Warning);

        log("threshold-test debug line");
        log_info("threshold-test info line");
        log_warning("threshold-test warning line");

        set_log_level(LogLevel::Debug);
        set_logger(Box::new(ConsoleLogger));

        let lines = lock(&captured);
        assert!(lines.iter().any(|l| l.contains("threshold-test warning line")));
        assert!(!lines.iter().any(|l| l.contains("threshold-test debug line")));
        assert!(!lines.iter().any(|l| l.contains("threshold-test info line")));
    }
}
