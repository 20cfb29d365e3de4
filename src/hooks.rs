//! Platform hook registration.
//!
//! `examples/original_source/Sys/src/os_hooks.c` gives every hook a weak
//! default definition (`__attribute__((weak))`) that the application may
//! override by linking its own symbol. Rust has no weak-symbol equivalent
//! usable from a `#![no_std]` library, so this crate replaces it with a
//! trait object registered once at startup — the same one-time-registration
//! shape the teacher uses for its globals (`spin::Once`), generalized from a
//! value to a `&'static dyn Platform`.

use crate::log::LogLevel;
use crate::status::StatusType;
use core::fmt;
use spin::Once;

/// Hooks and diagnostic primitives an integrator supplies. `diag_write` has
/// no default writer (there is no sink to fall back to below it), but every
/// other hook defaults to a log-and-return call through `diag_write` — the
/// Rust equivalent of the original's weak defaults, which each print a line
/// rather than stay silent.
pub trait Platform: Sync {
    /// Writes one formatted diagnostic line. Called by the logging facade
    /// and by the other hooks' defaults below; never called directly by
    /// kernel logic. No default: an integrator that registers a `Platform`
    /// without overriding this gets silence, same as wiring no UART.
    fn diag_write(&self, level: LogLevel, subsys: &str, args: fmt::Arguments) {
        let _ = (level, subsys, args);
    }

    /// Called once from `os_init`, before any task runs.
    fn startup_hook(&self) {
        self.diag_write(LogLevel::Info, "hooks", format_args!("StartupHook()"));
    }

    /// Called when the kernel shuts down (there is no required trigger for
    /// this in the cooperative single-core model; provided for parity with
    /// the original and for integrators that implement a shutdown service).
    fn shutdown_hook(&self) {
        self.diag_write(LogLevel::Info, "hooks", format_args!("ShutdownHook()"));
    }

    /// Called whenever a kernel API is about to return a non-`Ok` status.
    fn error_hook(&self, status: StatusType) {
        self.diag_write(LogLevel::Error, "hooks", format_args!("ErrorHook status={}", status));
    }

    /// Called immediately before the scheduler runs a task's entry point.
    fn pre_task_hook(&self) {
        let id = crate::sched::current_task();
        self.diag_write(LogLevel::Trace, "hooks", format_args!("PreTaskHook task={}", id));
    }

    /// Called immediately after a task's entry point returns.
    fn post_task_hook(&self) {
        let id = crate::sched::current_task();
        self.diag_write(LogLevel::Trace, "hooks", format_args!("PostTaskHook task={}", id));
    }
}

struct DefaultPlatform;

impl Platform for DefaultPlatform {}

static DEFAULT_PLATFORM: DefaultPlatform = DefaultPlatform;
static PLATFORM: Once<&'static dyn Platform> = Once::new();

/// Registers the platform's hook implementation. Intended to be called once,
/// from `os_init`; later calls are ignored (matching `Once`'s semantics) so
/// that a task cannot silently swap out error-reporting mid-run.
pub fn register_platform(platform: &'static dyn Platform) {
    PLATFORM.call_once(|| platform);
}

/// Returns the registered platform, or a no-op default if none was
/// registered yet (e.g. a kernel API called before `os_init`).
pub fn platform() -> &'static dyn Platform {
    *PLATFORM.get().unwrap_or(&&DEFAULT_PLATFORM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};
    use std::string::String;
    use std::vec::Vec;

    struct CountingPlatform {
        errors: AtomicU32,
    }

    impl Platform for CountingPlatform {
        fn error_hook(&self, _status: StatusType) {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// A `Platform` whose only override is `diag_write`, so every default
    /// hook method's log-and-return behavior runs for real and is captured.
    struct RecordingPlatform {
        lines: spin::Mutex<Vec<(LogLevel, String)>>,
    }

    impl RecordingPlatform {
        fn new() -> Self {
            Self { lines: spin::Mutex::new(Vec::new()) }
        }
    }

    impl Platform for RecordingPlatform {
        fn diag_write(&self, level: LogLevel, _subsys: &str, args: fmt::Arguments) {
            self.lines.lock().push((level, alloc_format(args)));
        }
    }

    fn alloc_format(args: fmt::Arguments) -> String {
        use core::fmt::Write;
        let mut s = String::new();
        let _ = s.write_fmt(args);
        s
    }

    #[test]
    fn default_hooks_log_through_diag_write_instead_of_staying_silent() {
        let p = RecordingPlatform::new();
        p.startup_hook();
        p.shutdown_hook();
        p.error_hook(StatusType::Limit);
        p.pre_task_hook();
        p.post_task_hook();

        let lines = p.lines.lock();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0].0, LogLevel::Info);
        assert!(lines[0].1.contains("StartupHook"));
        assert_eq!(lines[1].0, LogLevel::Info);
        assert!(lines[1].1.contains("ShutdownHook"));
        assert_eq!(lines[2].0, LogLevel::Error);
        assert!(lines[2].1.contains("LIMIT"));
        assert_eq!(lines[3].0, LogLevel::Trace);
        assert!(lines[3].1.contains("PreTaskHook"));
        assert_eq!(lines[4].0, LogLevel::Trace);
        assert!(lines[4].1.contains("PostTaskHook"));
    }

    #[test]
    fn default_platform_diag_write_is_silent_with_no_sink() {
        let p = platform();
        // No panic, no registered sink: the base primitive has nothing to
        // write to, unlike the hooks layered on top of it.
        p.startup_hook();
        p.error_hook(StatusType::Limit);
        p.pre_task_hook();
        p.post_task_hook();
    }

    #[test]
    fn counting_platform_observes_error_hook_directly() {
        let p = CountingPlatform { errors: AtomicU32::new(0) };
        p.error_hook(StatusType::Access);
        p.error_hook(StatusType::InvalidId);
        assert_eq!(p.errors.load(Ordering::Relaxed), 2);
    }
}
