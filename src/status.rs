//! The flat status code taxonomy returned by every kernel API.
//!
//! Grounded on the teacher's per-subsystem error enum (`SchedulerError` in
//! `sched/task.rs`), generalized to the single flat type an OSEK-family
//! kernel returns from every service — see spec §6/§7.

use core::fmt;

/// Status returned by value from every kernel API. There are no exceptions
/// and no panics on the error paths this enum covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusType {
    /// The operation completed successfully.
    Ok,
    /// A task's activation limit was exceeded; the activation was refused.
    Limit,
    /// An id (task, alarm, counter, schedule table, channel, function) was
    /// out of range.
    InvalidId,
    /// An argument value violated a precondition (e.g. a zero relative
    /// offset, or a cycle below a counter's minimum).
    InvalidValue,
    /// The target was not in a state that permits the requested operation.
    InvalidState,
    /// The operation is inapplicable right now (e.g. receive on an empty
    /// channel, or stopping an already-stopped schedule table).
    NoFunc,
    /// A trusted-function call was denied by the permission matrix.
    Access,
    /// A fatal diagnostic condition (stack guard breach) was detected.
    StackFault,
}

impl StatusType {
    /// True for [`StatusType::Ok`], false for every error variant.
    pub const fn is_ok(self) -> bool {
        matches!(self, StatusType::Ok)
    }

    /// Short tag used by the logging facade and by `Display`.
    pub const fn as_str(self) -> &'static str {
        match self {
            StatusType::Ok => "OK",
            StatusType::Limit => "LIMIT",
            StatusType::InvalidId => "INVALID_ID",
            StatusType::InvalidValue => "INVALID_VALUE",
            StatusType::InvalidState => "INVALID_STATE",
            StatusType::NoFunc => "NO_FUNC",
            StatusType::Access => "ACCESS",
            StatusType::StackFault => "STACK_FAULT",
        }
    }
}

/// Result alias for kernel APIs that return a value on success (`get_*`
/// queries) rather than a bare status, mirroring the teacher's
/// `SchedulerResult<T>` alias over `SchedulerError`.
pub type KernelResult<T> = Result<T, StatusType>;

impl fmt::Display for StatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routes a non-`Ok` status through the error hook before returning it,
/// mirroring `examples/original_source/Sys/src/os_hooks.c`'s
/// `ActivateTask_Hook`: validate, call `ErrorHook` on failure, return.
pub(crate) fn report(status: StatusType) -> StatusType {
    if !status.is_ok() {
        crate::hooks::platform().error_hook(status);
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_ok_only_for_ok_variant() {
        assert!(StatusType::Ok.is_ok());
        assert!(!StatusType::Limit.is_ok());
        assert!(!StatusType::Access.is_ok());
    }

    #[test]
    fn display_matches_tag() {
        assert_eq!(StatusType::InvalidValue.to_string(), "INVALID_VALUE");
    }
}
