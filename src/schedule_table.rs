//! Schedule-table engine: ordered expiry points fired over a cycle, with
//! catch-up for delayed ticks (§4.3).

use crate::alarm::AlarmAction;
use crate::config::{MAX_EXPIRY_POINTS, MAX_SCHEDULETABLES};
use crate::counter::{self, CounterId};
use crate::status::StatusType;
use crate::sync::CriticalSection;

pub type ScheduleTableId = usize;

#[derive(Clone, Copy)]
pub struct ExpiryPointConfig {
    pub offset: u32,
    pub action: AlarmAction,
}

/// Static, build-time description of one schedule table, supplied to
/// [`configure`]. `eps` must be in non-decreasing `offset` order and have
/// at most `MAX_EXPIRY_POINTS` entries.
#[derive(Clone, Copy)]
pub struct ScheduleTableConfig {
    pub counter: CounterId,
    pub duration: u32,
    pub cyclic: bool,
    pub eps: &'static [ExpiryPointConfig],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableState {
    Stopped,
    WaitingStart,
    Running,
}

#[derive(Clone, Copy)]
struct ScheduleTableRecord {
    counter: CounterId,
    duration: u32,
    cyclic: bool,
    eps: [Option<ExpiryPointConfig>; MAX_EXPIRY_POINTS],
    eps_count: usize,
    state: TableState,
    start_time: u32,
    cursor: usize,
    configured: bool,
}

impl ScheduleTableRecord {
    const fn unconfigured() -> Self {
        Self {
            counter: 0,
            duration: 1,
            cyclic: false,
            eps: [None; MAX_EXPIRY_POINTS],
            eps_count: 0,
            state: TableState::Stopped,
            start_time: 0,
            cursor: 0,
            configured: false,
        }
    }
}

static TABLES: CriticalSection<[ScheduleTableRecord; MAX_SCHEDULETABLES]> =
    CriticalSection::new([ScheduleTableRecord::unconfigured(); MAX_SCHEDULETABLES]);

/// Installs the static schedule-table configuration. Called once from
/// `os_init`.
pub(crate) fn configure(configs: &[(ScheduleTableId, ScheduleTableConfig)]) {
    let mut tables = TABLES.lock();
    for &(id, cfg) in configs {
        if id >= MAX_SCHEDULETABLES {
            continue;
        }
        let mut eps = [None; MAX_EXPIRY_POINTS];
        let n = cfg.eps.len().min(MAX_EXPIRY_POINTS);
        for i in 0..n {
            eps[i] = Some(cfg.eps[i]);
        }
        tables[id] = ScheduleTableRecord {
            counter: cfg.counter,
            duration: cfg.duration.max(1),
            cyclic: cfg.cyclic,
            eps,
            eps_count: n,
            state: TableState::Stopped,
            start_time: 0,
            cursor: 0,
            configured: true,
        };
    }
}

fn begin_start(id: ScheduleTableId, start_time: u32) -> StatusType {
    if id >= MAX_SCHEDULETABLES {
        return crate::status::report(StatusType::InvalidId);
    }
    let mut tables = TABLES.lock();
    let t = &mut tables[id];
    if !t.configured {
        return crate::status::report(StatusType::InvalidId);
    }
    if t.state != TableState::Stopped {
        return crate::status::report(StatusType::InvalidState);
    }
    t.start_time = start_time;
    t.cursor = 0;
    t.state = TableState::WaitingStart;
    StatusType::Ok
}

/// Starts `id` relative to the bound counter's current value. `offset` must
/// be `< counter.max`.
pub fn start_rel(id: ScheduleTableId, offset: u32) -> StatusType {
    if id >= MAX_SCHEDULETABLES {
        return crate::status::report(StatusType::InvalidId);
    }
    let counter_id = TABLES.lock()[id].counter;
    let max = counter::max_of(counter_id);
    if offset >= max {
        return crate::status::report(StatusType::InvalidValue);
    }
    let current = counter::current_of(counter_id);
    begin_start(id, (current + offset) % max)
}

/// Starts `id` at an absolute counter value. `start` must be `< counter.max`.
pub fn start_abs(id: ScheduleTableId, start: u32) -> StatusType {
    if id >= MAX_SCHEDULETABLES {
        return crate::status::report(StatusType::InvalidId);
    }
    let counter_id = TABLES.lock()[id].counter;
    let max = counter::max_of(counter_id);
    if start >= max {
        return crate::status::report(StatusType::InvalidValue);
    }
    begin_start(id, start)
}

/// Stops `id`. Fails [`StatusType::NoFunc`] if already stopped.
pub fn stop(id: ScheduleTableId) -> StatusType {
    if id >= MAX_SCHEDULETABLES {
        return crate::status::report(StatusType::InvalidId);
    }
    let mut tables = TABLES.lock();
    let t = &mut tables[id];
    if t.state == TableState::Stopped {
        return crate::status::report(StatusType::NoFunc);
    }
    t.state = TableState::Stopped;
    StatusType::Ok
}

/// Resynchronizes `id` to start `new_offset` ticks from now, resetting the
/// cursor. Fails [`StatusType::InvalidState`] if `id` is stopped.
pub fn sync(id: ScheduleTableId, new_offset: u32) -> StatusType {
    if id >= MAX_SCHEDULETABLES {
        return crate::status::report(StatusType::InvalidId);
    }
    let counter_id = TABLES.lock()[id].counter;
    let max = counter::max_of(counter_id);
    let current = counter::current_of(counter_id);
    let mut tables = TABLES.lock();
    let t = &mut tables[id];
    if t.state == TableState::Stopped {
        return crate::status::report(StatusType::InvalidState);
    }
    t.cursor = 0;
    t.start_time = (current + new_offset) % max;
    t.state = TableState::WaitingStart;
    StatusType::Ok
}

fn fire_due(t: &mut ScheduleTableRecord, elapsed: u32) -> [Option<AlarmAction>; MAX_EXPIRY_POINTS] {
    let mut due = [None; MAX_EXPIRY_POINTS];
    let mut n = 0;
    while t.cursor < t.eps_count {
        let ep = t.eps[t.cursor].expect("eps_count bounds configured slots");
        if ep.offset > elapsed {
            break;
        }
        due[n] = Some(ep.action);
        n += 1;
        t.cursor += 1;
    }
    due
}

/// Called from `counter_tick` for every table bound to `counter_id`. Fires
/// due expiry points in declared order, then handles cycle rollover
/// (catching up any points already due in the freshly started cycle,
/// within the same call — §4.3).
pub(crate) fn schedule_table_tick(counter_id: CounterId) {
    for id in 0..MAX_SCHEDULETABLES {
        let (should_process, max) = {
            let tables = TABLES.lock();
            let t = &tables[id];
            (t.configured && t.counter == counter_id && t.state != TableState::Stopped, counter::max_of(counter_id))
        };
        if !should_process {
            continue;
        }
        let current = counter::current_of(counter_id);

        let mut fired: [Option<AlarmAction>; MAX_EXPIRY_POINTS] = [None; MAX_EXPIRY_POINTS];
        let mut fired_count = 0;
        {
            let mut tables = TABLES.lock();
            let t = &mut tables[id];
            let mut elapsed = counter::diff_wrap(current, t.start_time, max);

            if t.state == TableState::WaitingStart {
                if elapsed < t.duration {
                    t.state = TableState::Running;
                } else if t.cyclic {
                    let periods = elapsed / t.duration;
                    t.start_time = (t.start_time + periods * t.duration) % max;
                    t.cursor = 0;
                    elapsed = counter::diff_wrap(current, t.start_time, max);
                    t.state = TableState::Running;
                } else {
                    t.state = TableState::Stopped;
                }
            }

            if t.state == TableState::Running {
                for slot in fire_due(t, elapsed) {
                    if let Some(action) = slot {
                        fired[fired_count] = Some(action);
                        fired_count += 1;
                    } else {
                        break;
                    }
                }

                if elapsed >= t.duration {
                    if t.cyclic {
                        let periods = elapsed / t.duration;
                        t.start_time = (t.start_time + periods * t.duration) % max;
                        t.cursor = 0;
                        let new_elapsed = counter::diff_wrap(current, t.start_time, max);
                        for slot in fire_due(t, new_elapsed) {
                            if let Some(action) = slot {
                                if fired_count < fired.len() {
                                    fired[fired_count] = Some(action);
                                    fired_count += 1;
                                }
                            } else {
                                break;
                            }
                        }
                        t.state = TableState::Running;
                    } else {
                        t.state = TableState::Stopped;
                    }
                }
            }
        }

        for slot in fired.iter().take(fired_count) {
            if let Some(action) = slot {
                action.perform();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::CounterConfig;

    fn noop() {}

    // Schedule tables are bound to the shared counter table (§4.3), so every
    // test here takes `sched::test_lock()` first.

    #[test]
    fn catch_up_fires_all_due_points_in_order() {
        let _guard = crate::sched::test_lock();
        static ORDER: CriticalSection<[u32; 3]> = CriticalSection::new([0; 3]);
        static NEXT: core::sync::atomic::AtomicUsize = core::sync::atomic::AtomicUsize::new(0);

        fn mark_200() {
            record(200);
        }
        fn mark_400() {
            record(400);
        }
        fn mark_800() {
            record(800);
        }
        fn record(v: u32) {
            let i = NEXT.fetch_add(1, core::sync::atomic::Ordering::Relaxed);
            if i < 3 {
                ORDER.lock()[i] = v;
            }
        }

        counter::configure(&[(2, CounterConfig { max: 10_000, ticks_per_base: 1, min_cycle: 1 })]);
        configure(&[(
            0,
            ScheduleTableConfig {
                counter: 2,
                duration: 2000,
                cyclic: true,
                eps: &[
                    ExpiryPointConfig { offset: 200, action: AlarmAction::Callback(mark_200) },
                    ExpiryPointConfig { offset: 400, action: AlarmAction::Callback(mark_400) },
                    ExpiryPointConfig { offset: 800, action: AlarmAction::Callback(mark_800) },
                ],
            },
        )]);

        assert_eq!(start_rel(0, 50), StatusType::Ok);
        for _ in 0..1050 {
            counter::counter_tick(2);
        }

        let order = *ORDER.lock();
        assert_eq!(order, [200, 400, 800]);
    }

    #[test]
    fn stop_twice_returns_no_func_second_time() {
        let _guard = crate::sched::test_lock();
        counter::configure(&[(3, CounterConfig { max: 1000, ticks_per_base: 1, min_cycle: 1 })]);
        configure(&[(1, ScheduleTableConfig { counter: 3, duration: 100, cyclic: false, eps: &[] })]);
        assert_eq!(start_rel(1, 10), StatusType::Ok);
        assert_eq!(stop(1), StatusType::Ok);
        assert_eq!(stop(1), StatusType::NoFunc);
    }

    #[test]
    fn start_rel_offset_out_of_range_is_invalid_value() {
        let _guard = crate::sched::test_lock();
        counter::configure(&[(1, CounterConfig { max: 100, ticks_per_base: 1, min_cycle: 1 })]);
        configure(&[(2, ScheduleTableConfig { counter: 1, duration: 10, cyclic: false, eps: &[] })]);
        assert_eq!(start_rel(2, 100), StatusType::InvalidValue);
    }
}
