//! Build-time configuration constants.
//!
//! All kernel tables are statically sized from the constants in this module;
//! nothing in this crate allocates at runtime. A real deployment tunes these
//! per application the way an OSEK OIL file tunes `TASK_NUM` et al. — here
//! they are plain `const`s the integrator edits before building.

/// Number of tasks in the system (dense index range `0..TASK_NUM`).
pub const TASK_NUM: usize = 8;

/// Number of counters (the base/software counter is conventionally id 0).
pub const MAX_COUNTERS: usize = 6;

/// Number of alarms in the system.
pub const MAX_ALARMS: usize = 16;

/// Maximum alarms a single counter may have attached.
pub const MAX_ALARMS_PER_COUNTER: usize = 8;

/// Number of schedule tables in the system.
pub const MAX_SCHEDULETABLES: usize = 4;

/// Maximum expiry points a single schedule table may declare.
pub const MAX_EXPIRY_POINTS: usize = 16;

/// Number of IOC channels in the system.
pub const MAX_IOC_CHANNELS: usize = 8;

/// Ring depth (in elements) of every IOC channel.
pub const IOC_BUFFER_SIZE: usize = 8;

/// Maximum element size, in bytes, an IOC channel may carry.
pub const IOC_MAX_DATA_SIZE: usize = 16;

/// Maximum receivers a single IOC channel may notify.
pub const MAX_IOC_RECEIVERS: usize = 4;

/// Number of registered trusted functions.
pub const TF_COUNT: usize = 8;

/// Number of applications (rows of the permission matrix).
pub const APP_NUM: usize = 4;
