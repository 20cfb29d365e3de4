//! Round-robin scheduler and scheduling-request glue (§4.4, §5).
//!
//! Tasks run to completion on the kernel stack; there is no context switch,
//! so unlike the teacher's `sched/mod.rs` (which context-switches between
//! `CpuContext`s via `schedule_next`/`tick`), this scheduler is a single
//! function that calls straight into the selected task's entry and returns
//! when it does. The recursion guard below resolves the open question in
//! spec §9 ("whether a task that re-enters `OS_Schedule` transitively is
//! supported is undefined... Implementers should forbid recursive
//! scheduling") by rejecting a nested call rather than allowing it.

use crate::config::TASK_NUM;
use crate::hooks;
use crate::status::StatusType;
use crate::task::{self, TaskId, TaskState};
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Sentinel meaning "no task has run yet"; round-robin starts its scan from
/// `(CURRENT + 1) % TASK_NUM`, so this must not collide with a real id when
/// `TASK_NUM` tasks are configured at id 0.
const NONE: usize = usize::MAX;

static CURRENT: AtomicUsize = AtomicUsize::new(NONE);
static IN_SCHEDULE: AtomicBool = AtomicBool::new(false);
static PENDING: AtomicBool = AtomicBool::new(false);

/// Returns the id of the task last dispatched by `schedule()`. Before the
/// first scheduling pass this is `0`, matching the "start scanning from
/// `(current_task + 1) mod TASK_NUM`" rule with no prior task recorded.
pub fn current_task() -> TaskId {
    match CURRENT.load(Ordering::Acquire) {
        NONE => 0,
        id => id,
    }
}

/// Marks a scheduling pass as due. The platform's main loop (or a pended
/// software interrupt, per §5) is expected to call `os_schedule()` shortly
/// after; this function never runs the scheduler itself.
pub(crate) fn request_schedule() {
    PENDING.store(true, Ordering::Release);
}

/// `true` if a scheduling request is outstanding. The platform's main loop
/// may poll this to decide when to call `os_schedule()`.
pub fn schedule_pending() -> bool {
    PENDING.load(Ordering::Acquire)
}

/// Runs one scheduling pass: scans task slots round-robin starting at
/// `(current_task + 1) mod TASK_NUM`, dispatches the first `READY` task to
/// completion, and returns. Returns [`StatusType::InvalidState`] without
/// doing anything if called re-entrantly (from within a task's own entry,
/// directly or transitively) — recursive scheduling is not supported.
pub fn schedule() -> StatusType {
    if IN_SCHEDULE.swap(true, Ordering::AcqRel) {
        return StatusType::InvalidState;
    }
    PENDING.store(false, Ordering::Release);

    let start = current_task();
    for offset in 1..=TASK_NUM {
        let id = (start + offset) % TASK_NUM;
        if task::state_of(id) == TaskState::Ready {
            task::set_state(id, TaskState::Running);
            CURRENT.store(id, Ordering::Release);
            if let Some(entry) = task::entry_of(id) {
                hooks::platform().pre_task_hook();
                entry();
                hooks::platform().post_task_hook();
            }
            break;
        }
    }

    IN_SCHEDULE.store(false, Ordering::Release);
    StatusType::Ok
}

/// Public entry point for the platform's main loop (§6).
pub fn os_schedule() -> StatusType {
    schedule()
}

/// Public entry point any kernel path (task code or, through the tick
/// source, ISR code) uses to ask for a scheduling pass soon (§6).
pub fn os_request_schedule() -> StatusType {
    request_schedule();
    StatusType::Ok
}

#[cfg(test)]
pub(crate) fn reset_for_test(start: TaskId) {
    CURRENT.store(start, Ordering::Release);
    IN_SCHEDULE.store(false, Ordering::Release);
    PENDING.store(false, Ordering::Release);
}

#[cfg(test)]
pub(crate) fn set_current_task_for_test(id: TaskId) {
    CURRENT.store(id, Ordering::Release);
}

/// `CURRENT` is one process-wide singleton, but `cargo test` runs a crate's
/// `#[test]` functions on multiple threads by default. Any test that reads
/// or writes `CURRENT` (directly or via `event.rs`/`trusted.rs`, which key
/// off `current_task()`) takes this lock first so two such tests can't
/// interleave their mutations of the same global.
#[cfg(test)]
static TEST_LOCK: spin::Mutex<()> = spin::Mutex::new(());

#[cfg(test)]
pub(crate) fn test_lock() -> spin::MutexGuard<'static, ()> {
    TEST_LOCK.lock()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{configure, get_task_state, TaskConfig};

    static RAN: AtomicBool = AtomicBool::new(false);

    fn marker_entry() {
        RAN.store(true, Ordering::Release);
        let _ = task::TaskState::Ready;
    }

    #[test]
    fn picks_first_ready_task_round_robin_from_current() {
        let _guard = test_lock();
        RAN.store(false, Ordering::Release);
        configure(&[
            (0, TaskConfig { entry: marker_entry, priority: 0, activation_limit: 1, app_id: 0 }),
            (1, TaskConfig { entry: marker_entry, priority: 0, activation_limit: 1, app_id: 0 }),
        ]);
        reset_for_test(0);
        crate::task::activate_task(1);

        assert_eq!(schedule(), StatusType::Ok);
        assert!(RAN.load(Ordering::Acquire));
        assert_eq!(current_task(), 1);
        assert_eq!(get_task_state(1).unwrap(), TaskState::Running);
    }

    #[test]
    fn recursive_schedule_call_is_rejected() {
        let _guard = test_lock();
        IN_SCHEDULE.store(true, Ordering::Release);
        assert_eq!(schedule(), StatusType::InvalidState);
        IN_SCHEDULE.store(false, Ordering::Release);
    }
}
