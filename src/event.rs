//! Event set/wait/clear (§4.5).
//!
//! A task suspends cooperatively: `wait_event` never spins or blocks inside
//! itself, it only records the wait mask and transitions to `WAITING`
//! before returning, trusting the caller (the task's own entry function) to
//! unwind immediately afterward — the design note in spec §9 on
//! "cooperative suspend without coroutines".

use crate::config::TASK_NUM;
use crate::status::StatusType;
use crate::task::{self, EventMask, TaskId};

/// Waits for any bit in `mask` to already be set on the calling task. If
/// none is set yet, transitions the task to `WAITING`; the entry function
/// must return immediately after this call so the scheduler can move on.
pub fn wait_event(mask: EventMask) -> StatusType {
    let current = crate::sched::current_task();
    task::begin_wait(current, mask);
    StatusType::Ok
}

/// Sets `mask` on `id`. If this makes a `WAITING` task eligible, requests a
/// scheduling pass (the wakeup itself is immediate; the woken task does not
/// run until the next `schedule()` — §5).
pub fn set_event(id: TaskId, mask: EventMask) -> StatusType {
    if id >= TASK_NUM {
        return crate::status::report(StatusType::InvalidId);
    }
    if task::raise_event(id, mask) {
        crate::sched::request_schedule();
    }
    StatusType::Ok
}

/// Clears `mask` from the calling task's set-mask.
pub fn clear_event(mask: EventMask) -> StatusType {
    let current = crate::sched::current_task();
    task::clear_event(current, mask);
    StatusType::Ok
}

/// Snapshots `id`'s set-mask.
pub fn get_event(id: TaskId) -> crate::status::KernelResult<EventMask> {
    if id >= TASK_NUM {
        crate::status::report(StatusType::InvalidId);
        return Err(StatusType::InvalidId);
    }
    Ok(task::event_mask_of(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{configure, get_task_state, TaskConfig, TaskState};

    fn noop() {}

    // `wait_event`/`set_event` key off the global `current_task()`, so each
    // test takes `sched::test_lock()` before touching it (see sched.rs) and
    // uses its own task id to avoid clashing with the other test's config.

    #[test]
    fn wakeup_moves_waiting_task_to_ready() {
        let _guard = crate::sched::test_lock();
        configure(&[(0, TaskConfig { entry: noop, priority: 0, activation_limit: 1, app_id: 0 })]);
        crate::sched::reset_for_test(0);
        crate::sched::set_current_task_for_test(0);
        assert_eq!(wait_event(0x1), StatusType::Ok);
        assert_eq!(get_task_state(0).unwrap(), TaskState::Waiting);

        assert_eq!(set_event(0, 0x1), StatusType::Ok);
        assert_eq!(get_task_state(0).unwrap(), TaskState::Ready);
    }

    #[test]
    fn wait_on_already_set_mask_does_not_suspend() {
        let _guard = crate::sched::test_lock();
        configure(&[(1, TaskConfig { entry: noop, priority: 0, activation_limit: 1, app_id: 0 })]);
        crate::sched::reset_for_test(1);
        crate::sched::set_current_task_for_test(1);
        set_event(1, 0x2);
        assert_eq!(wait_event(0x2), StatusType::Ok);
        assert_ne!(get_task_state(1).unwrap(), TaskState::Waiting);
    }
}
