//! Trusted function dispatcher: indexed registry gated by a per-application
//! permission matrix (§4.7).
//!
//! `examples/original_source/Sys/src/Os.c`'s `CallTrustedFunction` prints
//! `"[OS] AppN cannot call TFn"` before returning the access-denied status;
//! this crate follows that shape, routing the line through the logging
//! facade at `Warn` level instead of a raw `print_str` call (§4.7a).

use crate::config::{APP_NUM, TF_COUNT};
use crate::status::StatusType;
use crate::sync::CriticalSection;
use crate::task::AppId;

pub type TrustedFunctionId = usize;

/// Opaque parameter passed through to the called function unchanged — the
/// dispatcher never inspects it, matching the original's untyped `void*`.
pub type TrustedFunctionParam = usize;

pub type TrustedFunction = fn(TrustedFunctionParam);

#[derive(Clone, Copy)]
struct Registry {
    functions: [Option<TrustedFunction>; TF_COUNT],
    permissions: [[bool; TF_COUNT]; APP_NUM],
}

impl Registry {
    const fn empty() -> Self {
        Self {
            functions: [None; TF_COUNT],
            permissions: [[false; TF_COUNT]; APP_NUM],
        }
    }
}

static REGISTRY: CriticalSection<Registry> = CriticalSection::new(Registry::empty());

/// Installs the static function table and permission matrix. Called once
/// from `os_init`.
pub(crate) fn configure(functions: &[(TrustedFunctionId, TrustedFunction)], permissions: &[(AppId, TrustedFunctionId)]) {
    let mut reg = REGISTRY.lock();
    for &(id, f) in functions {
        if id < TF_COUNT {
            reg.functions[id] = Some(f);
        }
    }
    for &(app, id) in permissions {
        if app < APP_NUM && id < TF_COUNT {
            reg.permissions[app][id] = true;
        }
    }
}

/// Dispatches `index` on behalf of the calling task, after checking that
/// task's declared application identity against the permission matrix.
pub fn call_trusted_function(index: TrustedFunctionId, param: TrustedFunctionParam) -> StatusType {
    let app_id = crate::task::app_id_of(crate::sched::current_task());

    if index >= TF_COUNT {
        return crate::status::report(StatusType::Access);
    }

    let (allowed, function) = {
        let reg = REGISTRY.lock();
        (reg.permissions[app_id][index], reg.functions[index])
    };

    if !allowed {
        crate::rtos_warn!("trusted", "App{} cannot call TF{}", app_id, index);
        return crate::status::report(StatusType::Access);
    }

    if let Some(f) = function {
        f(param);
    }
    StatusType::Ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{configure as configure_tasks, TaskConfig};

    static CALLED: core::sync::atomic::AtomicUsize = core::sync::atomic::AtomicUsize::new(0);

    fn tf0(_param: TrustedFunctionParam) {
        CALLED.fetch_add(1, core::sync::atomic::Ordering::Relaxed);
    }

    #[test]
    fn denied_call_does_not_invoke_function_and_returns_access() {
        let _guard = crate::sched::test_lock();
        CALLED.store(0, core::sync::atomic::Ordering::Relaxed);
        configure_tasks(&[(6, TaskConfig { entry: || {}, priority: 0, activation_limit: 1, app_id: 1 })]);
        crate::sched::set_current_task_for_test(6);
        configure(&[(0, tf0)], &[]);

        assert_eq!(call_trusted_function(0, 0), StatusType::Access);
        assert_eq!(CALLED.load(core::sync::atomic::Ordering::Relaxed), 0);
    }

    #[test]
    fn allowed_call_invokes_function_and_returns_ok() {
        let _guard = crate::sched::test_lock();
        CALLED.store(0, core::sync::atomic::Ordering::Relaxed);
        configure_tasks(&[(7, TaskConfig { entry: || {}, priority: 0, activation_limit: 1, app_id: 2 })]);
        crate::sched::set_current_task_for_test(7);
        configure(&[(1, tf0)], &[(2, 1)]);

        assert_eq!(call_trusted_function(1, 0), StatusType::Ok);
        assert_eq!(CALLED.load(core::sync::atomic::Ordering::Relaxed), 1);
    }
}
