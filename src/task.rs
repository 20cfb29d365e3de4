//! Static task table: activation counting, state machine, event masks.
//!
//! Grounded on the teacher's `sched/task.rs` (`TaskId` alias, a `TaskState`
//! enum, and a `SchedulerResult<T>` pattern for query ops), generalized from
//! a heap-backed TCB with a saved CPU context to an inline, statically sized
//! record with no stack of its own — this kernel is cooperative and runs
//! every task to completion on the kernel stack (§4.4), so there is no
//! context to save.

use crate::config::TASK_NUM;
use crate::status::{KernelResult, StatusType};
use crate::sync::CriticalSection;

/// Dense index into the task table.
pub type TaskId = usize;

/// 32 independent event flags.
pub type EventMask = u32;

/// Application identifier, indexes the trusted-function permission matrix.
pub type AppId = usize;

/// Zero-argument task body.
pub type TaskEntry = fn();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Suspended,
    Ready,
    Running,
    Waiting,
}

/// Static, build-time description of one task, supplied to [`configure`].
#[derive(Clone, Copy)]
pub struct TaskConfig {
    pub entry: TaskEntry,
    pub priority: u8,
    pub activation_limit: u8,
    pub app_id: AppId,
}

#[derive(Clone, Copy)]
struct TaskRecord {
    entry: Option<TaskEntry>,
    state: TaskState,
    priority: u8,
    activation_count: u8,
    activation_limit: u8,
    set_mask: EventMask,
    wait_mask: EventMask,
    app_id: AppId,
}

impl TaskRecord {
    const fn unconfigured() -> Self {
        Self {
            entry: None,
            state: TaskState::Suspended,
            priority: 0,
            activation_count: 0,
            activation_limit: 0,
            set_mask: 0,
            wait_mask: 0,
            app_id: 0,
        }
    }
}

static TASKS: CriticalSection<[TaskRecord; TASK_NUM]> =
    CriticalSection::new([TaskRecord::unconfigured(); TASK_NUM]);

/// Installs the static task configuration. Called once from `os_init`;
/// a slot left out of `configs` stays unconfigured (`activation_limit == 0`,
/// so `activate_task` on it always returns [`StatusType::Limit`]).
pub(crate) fn configure(configs: &[(TaskId, TaskConfig)]) {
    let mut tasks = TASKS.lock();
    for &(id, cfg) in configs {
        if id < TASK_NUM {
            tasks[id] = TaskRecord {
                entry: Some(cfg.entry),
                state: TaskState::Suspended,
                priority: cfg.priority,
                activation_count: 0,
                activation_limit: cfg.activation_limit,
                set_mask: 0,
                wait_mask: 0,
                app_id: cfg.app_id,
            };
        }
    }
}

/// Requests that `id` run. Increments its activation count and, if it was
/// `SUSPENDED`, moves it to `READY`. Does not itself invoke the scheduler —
/// see §5: activation only marks eligibility, the next scheduler pass runs
/// the task.
pub fn activate_task(id: TaskId) -> StatusType {
    if id >= TASK_NUM {
        return crate::status::report(StatusType::InvalidId);
    }
    let mut tasks = TASKS.lock();
    let t = &mut tasks[id];
    if t.activation_count == t.activation_limit {
        return crate::status::report(StatusType::Limit);
    }
    t.activation_count += 1;
    let became_ready = t.state == TaskState::Suspended;
    if became_ready {
        t.state = TaskState::Ready;
    }
    drop(tasks);
    if became_ready {
        crate::sched::request_schedule();
    }
    StatusType::Ok
}

/// Ends the calling task's current activation. Must be the last operation a
/// task's entry performs; the cooperative runtime realises "does not return
/// to its caller" by the entry function returning normally right after.
pub fn terminate_task() -> StatusType {
    let current = crate::sched::current_task();
    let mut tasks = TASKS.lock();
    let t = &mut tasks[current];
    t.activation_count = t.activation_count.saturating_sub(1);
    t.state = if t.activation_count > 0 {
        TaskState::Ready
    } else {
        TaskState::Suspended
    };
    StatusType::Ok
}

/// Activates `id` and then terminates the calling task. The activation is
/// guaranteed to be applied before the termination takes effect.
pub fn chain_task(id: TaskId) -> StatusType {
    let status = activate_task(id);
    if !status.is_ok() {
        return status;
    }
    terminate_task()
}

/// Snapshots `id`'s state.
pub fn get_task_state(id: TaskId) -> KernelResult<TaskState> {
    if id >= TASK_NUM {
        crate::status::report(StatusType::InvalidId);
        return Err(StatusType::InvalidId);
    }
    Ok(TASKS.lock()[id].state)
}

/// If `(set_mask & mask) != 0` already, reports "already satisfied" and
/// leaves the task's state untouched. Otherwise records `wait_mask` and
/// moves the task to `WAITING`. Operates on `id` directly so `event.rs` can
/// call it for the current task without re-deriving lock discipline.
pub(crate) fn begin_wait(id: TaskId, mask: EventMask) -> bool {
    let mut tasks = TASKS.lock();
    let t = &mut tasks[id];
    if t.set_mask & mask != 0 {
        return true;
    }
    t.wait_mask = mask;
    t.state = TaskState::Waiting;
    false
}

/// ORs `mask` into `id`'s set-mask. Returns `true` if this made a `WAITING`
/// task eligible to run (caller is responsible for raising a scheduling
/// request — see §5).
pub(crate) fn raise_event(id: TaskId, mask: EventMask) -> bool {
    let mut tasks = TASKS.lock();
    let t = &mut tasks[id];
    t.set_mask |= mask;
    if t.state == TaskState::Waiting && t.set_mask & t.wait_mask != 0 {
        t.wait_mask = 0;
        t.state = TaskState::Ready;
        true
    } else {
        false
    }
}

/// AND-NOTs `mask` out of `id`'s set-mask.
pub(crate) fn clear_event(id: TaskId, mask: EventMask) {
    TASKS.lock()[id].set_mask &= !mask;
}

pub(crate) fn event_mask_of(id: TaskId) -> EventMask {
    TASKS.lock()[id].set_mask
}

pub(crate) fn entry_of(id: TaskId) -> Option<TaskEntry> {
    if id >= TASK_NUM {
        return None;
    }
    TASKS.lock()[id].entry
}

pub(crate) fn state_of(id: TaskId) -> TaskState {
    TASKS.lock()[id].state
}

pub(crate) fn set_state(id: TaskId, state: TaskState) {
    TASKS.lock()[id].state = state;
}

pub(crate) fn app_id_of(id: TaskId) -> AppId {
    TASKS.lock()[id].app_id
}
