//! Monotonic modular counters — the dispatch root for alarms and schedule
//! tables (§4.1).

use crate::alarm::AlarmId;
use crate::config::{MAX_ALARMS_PER_COUNTER, MAX_COUNTERS};
use crate::status::{KernelResult, StatusType};
use crate::sync::CriticalSection;

pub type CounterId = usize;

/// Static, build-time description of one counter, supplied to [`configure`].
#[derive(Clone, Copy)]
pub struct CounterConfig {
    pub max: u32,
    pub ticks_per_base: u32,
    pub min_cycle: u32,
}

#[derive(Clone, Copy)]
struct CounterRecord {
    current: u32,
    max: u32,
    ticks_per_base: u32,
    min_cycle: u32,
    alarms: [Option<AlarmId>; MAX_ALARMS_PER_COUNTER],
    alarm_count: usize,
    configured: bool,
}

impl CounterRecord {
    const fn unconfigured() -> Self {
        Self {
            current: 0,
            max: 1,
            ticks_per_base: 1,
            min_cycle: 0,
            alarms: [None; MAX_ALARMS_PER_COUNTER],
            alarm_count: 0,
            configured: false,
        }
    }
}

static COUNTERS: CriticalSection<[CounterRecord; MAX_COUNTERS]> =
    CriticalSection::new([CounterRecord::unconfigured(); MAX_COUNTERS]);

/// Installs the static counter configuration. Called once from `os_init`.
pub(crate) fn configure(configs: &[(CounterId, CounterConfig)]) {
    let mut counters = COUNTERS.lock();
    for &(id, cfg) in configs {
        if id < MAX_COUNTERS {
            counters[id] = CounterRecord {
                current: 0,
                max: cfg.max.max(1),
                ticks_per_base: cfg.ticks_per_base,
                min_cycle: cfg.min_cycle,
                alarms: [None; MAX_ALARMS_PER_COUNTER],
                alarm_count: 0,
                configured: true,
            };
        }
    }
}

/// Attaches `alarm` to `counter`, in call order — attach order defines the
/// order alarms fire within a tick (§4.1). Configuration-time only.
pub(crate) fn attach_alarm(counter: CounterId, alarm: AlarmId) -> bool {
    if counter >= MAX_COUNTERS {
        return false;
    }
    let mut counters = COUNTERS.lock();
    let c = &mut counters[counter];
    if !c.configured || c.alarm_count == MAX_ALARMS_PER_COUNTER {
        return false;
    }
    c.alarms[c.alarm_count] = Some(alarm);
    c.alarm_count += 1;
    true
}

pub(crate) fn current_of(id: CounterId) -> u32 {
    COUNTERS.lock()[id].current
}

pub(crate) fn max_of(id: CounterId) -> u32 {
    COUNTERS.lock()[id].max
}

pub(crate) fn min_cycle_of(id: CounterId) -> u32 {
    COUNTERS.lock()[id].min_cycle
}

pub(crate) fn is_configured(id: CounterId) -> bool {
    id < MAX_COUNTERS && COUNTERS.lock()[id].configured
}

/// Returns the current value of a counter (§6 query surface, not part of
/// the core kernel API list but useful to application code scheduling its
/// own timeouts).
pub fn get_counter_value(id: CounterId) -> KernelResult<u32> {
    if !is_configured(id) {
        crate::status::report(StatusType::InvalidId);
        return Err(StatusType::InvalidId);
    }
    Ok(current_of(id))
}

/// Advances `id` by one tick, then dispatches any alarms whose `expiry`
/// equals the new value (in attachment order), then the schedule-table
/// tick for the same counter. The counter's own lock is released before
/// alarm/schedule-table dispatch begins — no kernel API ever holds two
/// table locks at once.
pub fn counter_tick(id: CounterId) -> StatusType {
    if id >= MAX_COUNTERS {
        return crate::status::report(StatusType::InvalidId);
    }

    let (current, max, alarms, alarm_count) = {
        let mut counters = COUNTERS.lock();
        let c = &mut counters[id];
        if !c.configured {
            return crate::status::report(StatusType::InvalidId);
        }
        c.current = (c.current + 1) % c.max;
        (c.current, c.max, c.alarms, c.alarm_count)
    };

    for slot in alarms.iter().take(alarm_count) {
        if let Some(alarm_id) = slot {
            crate::alarm::fire_if_due(*alarm_id, current, max);
        }
    }

    crate::schedule_table::schedule_table_tick(id);
    StatusType::Ok
}

/// `elapsed = diff_wrap(current, start, max)` — distance travelled forward
/// from `start` to `current` around a counter that wraps at `max` (§4.3).
pub(crate) fn diff_wrap(current: u32, start: u32, max: u32) -> u32 {
    if current >= start {
        current - start
    } else {
        max - start + current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Counters are a process-wide singleton table (§5) shared with
    // alarm.rs/schedule_table.rs/lib.rs tests, so every test here takes
    // `sched::test_lock()` first. Counter ids 4/5 are reserved — no other
    // module's tests configure them — so `unconfigured_counter_tick_rejected`
    // below has an id guaranteed to stay unconfigured for the life of the
    // test binary.

    #[test]
    fn tick_advances_modulo_max() {
        let _guard = crate::sched::test_lock();
        configure(&[(0, CounterConfig { max: 10, ticks_per_base: 1, min_cycle: 1 })]);
        for _ in 0..9 {
            counter_tick(0);
        }
        assert_eq!(current_of(0), 9);
        counter_tick(0);
        assert_eq!(current_of(0), 0);
    }

    #[test]
    fn diff_wrap_handles_wraparound() {
        assert_eq!(diff_wrap(5, 2, 10), 3);
        assert_eq!(diff_wrap(1, 8, 10), 3);
    }

    #[test]
    fn unconfigured_counter_tick_rejected() {
        let _guard = crate::sched::test_lock();
        assert_eq!(counter_tick(MAX_COUNTERS - 1).is_ok(), false);
    }
}
