//! Statically-configured cooperative RTOS core (OSEK/AUTOSAR-OS family).
//!
//! Tasks, events, alarms, schedule tables, bounded IOC channels and a
//! trusted-function permission gate, built around a single tick source and
//! a non-preemptive round-robin scheduler. Every table is sized at build
//! time from [`config`]; nothing in this crate allocates at runtime.
//!
//! Call [`os_init`] once at startup with a [`SystemConfig`] describing the
//! static tables, then drive the tick source (`counter_tick(0)`) from the
//! platform's periodic interrupt and call [`os_schedule`] from the main
//! loop whenever [`schedule_pending`] is true.

#![cfg_attr(not(test), no_std)]

pub mod config;

mod alarm;
mod counter;
mod event;
mod hooks;
mod ioc;
mod log;
mod sched;
mod schedule_table;
mod status;
mod sync;
mod task;
mod trusted;

pub use alarm::{set_abs_alarm, set_rel_alarm, cancel_alarm, get_alarm, AlarmAction, AlarmConfig, AlarmId};
pub use counter::{counter_tick, get_counter_value, CounterConfig, CounterId};
pub use event::{clear_event, get_event, set_event, wait_event};
pub use hooks::{register_platform, Platform};
pub use ioc::{has_new_data, init_channel, receive, receive_group, send, IocChannelConfig, IocChannelId};
pub use log::{set_log_level, LogLevel};
pub use sched::{current_task, os_request_schedule, os_schedule, schedule_pending};
pub use schedule_table::{start_abs, start_rel, stop, sync as sync_table, ExpiryPointConfig, ScheduleTableConfig, ScheduleTableId};
pub use status::{KernelResult, StatusType};
pub use task::{activate_task, chain_task, get_task_state, terminate_task, AppId, EventMask, TaskConfig, TaskEntry, TaskId, TaskState};
pub use trusted::{call_trusted_function, TrustedFunction, TrustedFunctionId, TrustedFunctionParam};

/// Every static table an application assembles and hands to [`os_init`] —
/// the Rust-native replacement for the OSEK OIL-generated `static const`
/// tables in the original C kernel (`TaskTable[]`, `s_trustedFunctions`,
/// `s_trustedPermissions`).
pub struct SystemConfig<'a> {
    pub tasks: &'a [(TaskId, TaskConfig)],
    pub counters: &'a [(CounterId, CounterConfig)],
    pub alarms: &'a [(AlarmId, AlarmConfig)],
    pub schedule_tables: &'a [(ScheduleTableId, ScheduleTableConfig)],
    pub ioc_channels: &'a [(IocChannelId, IocChannelConfig)],
    pub trusted_functions: &'a [(TrustedFunctionId, TrustedFunction)],
    pub permissions: &'a [(AppId, TrustedFunctionId)],
    pub platform: &'static dyn Platform,
}

/// Installs every static table and registers the platform, in that order.
/// Must be called exactly once, before the tick source starts and before
/// any task is activated. Does not itself activate or run any task.
pub fn os_init(cfg: SystemConfig) {
    hooks::register_platform(cfg.platform);
    task::configure(cfg.tasks);
    counter::configure(cfg.counters);
    alarm::configure(cfg.alarms);
    schedule_table::configure(cfg.schedule_tables);
    ioc::configure(cfg.ioc_channels);
    trusted::configure(cfg.trusted_functions, cfg.permissions);
    hooks::platform().startup_hook();
}
