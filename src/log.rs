//! Leveled, subsystem-tagged logging facade.
//!
//! Format: `[subsys][LEVEL] message`. Grounded on the teacher's `log.rs`
//! (`LogLevel`, the global atomic level filter, `_log`/`should_log`), with
//! the per-cpu/per-pid prefix dropped (single-core, and task identity is
//! already visible in most call sites) and output routed through the
//! `Platform::diag_write` primitive (§6) instead of a UART driver, since the
//! UART driver itself is out of scope.

use core::fmt;

/// Severity of a log line. Ordered so `level <= filter` means "log it".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static LOG_LEVEL: core::sync::atomic::AtomicU8 = core::sync::atomic::AtomicU8::new(LogLevel::Info as u8);

/// Sets the global log level filter. Messages above this level are dropped.
pub fn set_log_level(level: LogLevel) {
    LOG_LEVEL.store(level as u8, core::sync::atomic::Ordering::Relaxed);
}

/// Reads the global log level filter.
pub fn get_log_level() -> LogLevel {
    match LOG_LEVEL.load(core::sync::atomic::Ordering::Relaxed) {
        0 => LogLevel::Error,
        1 => LogLevel::Warn,
        2 => LogLevel::Info,
        3 => LogLevel::Debug,
        _ => LogLevel::Trace,
    }
}

#[inline]
pub fn should_log(level: LogLevel) -> bool {
    level <= get_log_level()
}

/// Internal entry point for the `rtos_*!` macros. Not part of the public API.
#[doc(hidden)]
pub fn _log(level: LogLevel, subsys: &str, args: fmt::Arguments) {
    if !should_log(level) {
        return;
    }
    crate::hooks::platform().diag_write(level, subsys, args);
}

#[macro_export]
macro_rules! rtos_error {
    ($subsys:expr, $($arg:tt)*) => {
        $crate::log::_log($crate::log::LogLevel::Error, $subsys, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! rtos_warn {
    ($subsys:expr, $($arg:tt)*) => {
        $crate::log::_log($crate::log::LogLevel::Warn, $subsys, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! rtos_info {
    ($subsys:expr, $($arg:tt)*) => {
        $crate::log::_log($crate::log::LogLevel::Info, $subsys, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! rtos_debug {
    ($subsys:expr, $($arg:tt)*) => {
        $crate::log::_log($crate::log::LogLevel::Debug, $subsys, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! rtos_trace {
    ($subsys:expr, $($arg:tt)*) => {
        $crate::log::_log($crate::log::LogLevel::Trace, $subsys, format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_excludes_lower_priority() {
        set_log_level(LogLevel::Warn);
        assert!(should_log(LogLevel::Error));
        assert!(should_log(LogLevel::Warn));
        assert!(!should_log(LogLevel::Info));
        set_log_level(LogLevel::Info);
    }

    #[test]
    fn ordering_is_severity_ascending() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Trace);
    }
}
