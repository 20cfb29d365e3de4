//! Alarm engine: one-shot or cyclic expirations bound to a counter (§4.2).

use crate::config::MAX_ALARMS;
use crate::counter::{self, CounterId};
use crate::status::{KernelResult, StatusType};
use crate::sync::CriticalSection;
use crate::task::{EventMask, TaskId};

pub type AlarmId = usize;

/// Action performed when an alarm (or a schedule-table expiry point, which
/// shares this type — spec §9) fires. No runtime polymorphism: a plain sum
/// type with the payload stored inline.
#[derive(Clone, Copy)]
pub enum AlarmAction {
    ActivateTask(TaskId),
    SetEvent { task: TaskId, mask: EventMask },
    Callback(fn()),
}

impl AlarmAction {
    pub(crate) fn perform(self) {
        match self {
            AlarmAction::ActivateTask(id) => {
                crate::task::activate_task(id);
            }
            AlarmAction::SetEvent { task, mask } => {
                crate::event::set_event(task, mask);
            }
            AlarmAction::Callback(f) => f(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlarmState {
    Inactive,
    Active,
}

/// Static, build-time description of one alarm, supplied to [`configure`].
#[derive(Clone, Copy)]
pub struct AlarmConfig {
    pub counter: CounterId,
    pub action: AlarmAction,
}

#[derive(Clone, Copy)]
struct AlarmRecord {
    state: AlarmState,
    expiry: u32,
    cycle: u32,
    action: Option<AlarmAction>,
    counter: CounterId,
    bound: bool,
}

impl AlarmRecord {
    const fn unbound() -> Self {
        Self {
            state: AlarmState::Inactive,
            expiry: 0,
            cycle: 0,
            action: None,
            counter: 0,
            bound: false,
        }
    }
}

static ALARMS: CriticalSection<[AlarmRecord; MAX_ALARMS]> =
    CriticalSection::new([AlarmRecord::unbound(); MAX_ALARMS]);

/// Installs the static alarm configuration and attaches each alarm to its
/// counter, in the order given — this is the iteration order alarms will
/// fire in on their counter's tick (§4.1).
pub(crate) fn configure(configs: &[(AlarmId, AlarmConfig)]) {
    let mut alarms = ALARMS.lock();
    for &(id, cfg) in configs {
        if id < MAX_ALARMS {
            alarms[id] = AlarmRecord {
                state: AlarmState::Inactive,
                expiry: 0,
                cycle: 0,
                action: Some(cfg.action),
                counter: cfg.counter,
                bound: true,
            };
        }
    }
    drop(alarms);
    for &(id, cfg) in configs {
        if id < MAX_ALARMS {
            counter::attach_alarm(cfg.counter, id);
        }
    }
}

fn check_preconditions(id: AlarmId, cycle: u32) -> Result<(CounterId, u32), StatusType> {
    if id >= MAX_ALARMS {
        return Err(StatusType::InvalidId);
    }
    let (counter_id, bound) = {
        let alarms = ALARMS.lock();
        (alarms[id].counter, alarms[id].bound)
    };
    if !bound {
        return Err(StatusType::InvalidState);
    }
    if cycle > 0 && cycle < counter::min_cycle_of(counter_id) {
        return Err(StatusType::InvalidValue);
    }
    Ok((counter_id, counter::max_of(counter_id)))
}

/// Arms `id` to fire `offset` ticks from now, then every `cycle` ticks if
/// `cycle > 0`. Overwrites any existing schedule (re-arming an already
/// `ACTIVE` alarm is allowed).
pub fn set_rel_alarm(id: AlarmId, offset: u32, cycle: u32) -> StatusType {
    if offset == 0 {
        return crate::status::report(StatusType::InvalidValue);
    }
    let (counter_id, max) = match check_preconditions(id, cycle) {
        Ok(v) => v,
        Err(e) => return crate::status::report(e),
    };
    let current = counter::current_of(counter_id);
    let expiry = current.wrapping_add(offset) % max;
    let mut alarms = ALARMS.lock();
    let a = &mut alarms[id];
    a.expiry = expiry;
    a.cycle = cycle;
    a.state = AlarmState::Active;
    StatusType::Ok
}

/// Arms `id` to fire when the counter reaches `start` (mod `max`).
pub fn set_abs_alarm(id: AlarmId, start: u32, cycle: u32) -> StatusType {
    let (counter_id, max) = match check_preconditions(id, cycle) {
        Ok(v) => v,
        Err(e) => return crate::status::report(e),
    };
    let _ = counter_id;
    let mut alarms = ALARMS.lock();
    let a = &mut alarms[id];
    a.expiry = start % max;
    a.cycle = cycle;
    a.state = AlarmState::Active;
    StatusType::Ok
}

/// Deactivates `id`. Idempotent: cancelling an already-`INACTIVE` alarm
/// still returns `OK` and leaves every other field untouched.
pub fn cancel_alarm(id: AlarmId) -> StatusType {
    if id >= MAX_ALARMS {
        return crate::status::report(StatusType::InvalidId);
    }
    ALARMS.lock()[id].state = AlarmState::Inactive;
    StatusType::Ok
}

/// Ticks remaining until `id` fires, wrapping through the counter's `max`.
pub fn get_alarm(id: AlarmId) -> KernelResult<u32> {
    if id >= MAX_ALARMS {
        crate::status::report(StatusType::InvalidId);
        return Err(StatusType::InvalidId);
    }
    let (state, expiry, counter_id) = {
        let alarms = ALARMS.lock();
        (alarms[id].state, alarms[id].expiry, alarms[id].counter)
    };
    if state != AlarmState::Active {
        crate::status::report(StatusType::NoFunc);
        return Err(StatusType::NoFunc);
    }
    let current = counter::current_of(counter_id);
    let max = counter::max_of(counter_id);
    Ok(counter::diff_wrap(expiry, current, max))
}

/// Called from `counter_tick` once per attached alarm, after the counter
/// has already advanced and its lock has been released. Fires the alarm's
/// action exactly when `expiry == current`, then re-arms (cyclic) or
/// deactivates (one-shot) it.
pub(crate) fn fire_if_due(id: AlarmId, current: u32, max: u32) {
    let (due, cycle, action) = {
        let alarms = ALARMS.lock();
        let a = &alarms[id];
        if a.state != AlarmState::Active || a.expiry != current {
            (false, 0, None)
        } else {
            (true, a.cycle, a.action)
        }
    };
    if !due {
        return;
    }
    {
        let mut alarms = ALARMS.lock();
        let a = &mut alarms[id];
        if cycle > 0 {
            a.expiry = (current + cycle) % max;
        } else {
            a.state = AlarmState::Inactive;
        }
    }
    if let Some(action) = action {
        action.perform();
    }
}
