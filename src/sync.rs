//! The single mutual-exclusion primitive kernel tables are guarded by.
//!
//! The teacher's `sync` module offers a hand-rolled `SpinLock` with
//! exponential backoff (`sync/spin.rs`) and an `IrqSpinLock` variant for
//! interrupt-masked sections (`sync/mod.rs`), aimed at a multi-core
//! preemptive kernel. The correctness property this crate needs is simpler:
//! mutual exclusion, on a single core, between the periodic tick path and
//! task-context kernel calls. Backoff tuned for multi-core contention buys
//! nothing here, so `CriticalSection<T>` is a thin, directly-named wrapper
//! around `spin::Mutex` (already a teacher dependency) rather than a
//! reimplementation of the teacher's backoff loop.

use spin::{Mutex, MutexGuard};

/// Guards one kernel table. Every public kernel API locks at most one
/// `CriticalSection` at a time — never two nested — so lock ordering is not
/// a concern here the way it is for the teacher's multi-lock subsystems.
pub struct CriticalSection<T> {
    inner: Mutex<T>,
}

impl<T> CriticalSection<T> {
    pub const fn new(value: T) -> Self {
        Self { inner: Mutex::new(value) }
    }

    /// Locks the table for the duration of the returned guard. On a single
    /// core with no nested locking this cannot deadlock and cannot block
    /// for long: every kernel API does bounded, allocation-free table
    /// mutation before releasing it.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_grants_exclusive_mutable_access() {
        let cs = CriticalSection::new(0u32);
        {
            let mut guard = cs.lock();
            *guard += 1;
        }
        assert_eq!(*cs.lock(), 1);
    }
}
