//! Synchronization utilities for poison-tolerant mutex handling
//!
//! The system log queues keep only counters, flags and a `Vec` behind their
//! mutex, and every critical section leaves that state consistent before it
//! can panic. A poisoned lock is therefore recovered instead of turned into
//! an error, which keeps the fire-and-forget producer paths infallible.

use std::sync::{Condvar, LockResult, Mutex, MutexGuard, PoisonError, WaitTimeoutResult};
use std::time::Duration;

/// Recover the guard from a possibly poisoned lock result
///
/// Works for plain lock results as well as the `(guard, timeout)` pairs
/// returned by condition variable waits.
pub fn recover_poison<T>(result: LockResult<T>) -> T {
    result.unwrap_or_else(PoisonError::into_inner)
}

/// Lock a mutex, recovering the guard if a previous holder panicked
pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    recover_poison(mutex.lock())
}

/// Wait on a condition variable while `condition` holds, bounded by `timeout`
///
/// Spurious wakeups are absorbed by re-checking `condition`. Returns the
/// re-acquired guard and whether the wait ended because the timeout elapsed
/// with the condition still holding.
pub fn wait_timeout_while_unpoisoned<'a, T, F>(
    condvar: &Condvar,
    guard: MutexGuard<'a, T>,
    timeout: Duration,
    condition: F,
) -> (MutexGuard<'a, T>, bool)
where
    F: FnMut(&mut T) -> bool,
{
    let (guard, result): (MutexGuard<'a, T>, WaitTimeoutResult) =
        recover_poison(condvar.wait_timeout_while(guard, timeout, condition));
    (guard, result.timed_out())
}
