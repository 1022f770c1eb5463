//! Per-thread memory accounting
//!
//! A [`MemoryBudget`] is attached to the thread doing work on behalf of some
//! unit (typically a query). Allocations reported through [`MemoryTracker`]
//! are charged to whichever budget is attached to the calling thread, unless a
//! [`MemoryTrackerBlocker`] is alive on that thread.

use crate::resource::error::{ResourceError, ResourceResult};
use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

thread_local! {
    static CURRENT_BUDGET: RefCell<Option<Arc<MemoryBudget>>> = const { RefCell::new(None) };
    static BLOCKER_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// A named memory budget with an optional hard limit
#[derive(Debug)]
pub struct MemoryBudget {
    name: String,
    limit: Option<usize>,
    used: AtomicUsize,
    peak: AtomicUsize,
}

impl MemoryBudget {
    pub fn new(name: impl Into<String>, limit: Option<usize>) -> Self {
        Self {
            name: name.into(),
            limit,
            used: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn used(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Acquire)
    }

    /// Charge `bytes` to the budget, refusing if the hard limit would be crossed
    pub fn try_alloc(&self, bytes: usize) -> ResourceResult<()> {
        let mut current = self.used.load(Ordering::Acquire);
        loop {
            let next = current.saturating_add(bytes);
            if let Some(limit) = self.limit {
                if next > limit {
                    return Err(ResourceError::MemoryLimitExceeded {
                        budget: self.name.clone(),
                        requested: bytes,
                        used: current,
                        limit,
                    });
                }
            }
            match self
                .used
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    self.peak.fetch_max(next, Ordering::AcqRel);
                    return Ok(());
                }
                Err(actual) => current = actual,
            }
        }
    }

    pub fn free(&self, bytes: usize) {
        let _ = self
            .used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                Some(used.saturating_sub(bytes))
            });
    }
}

/// Entry points for charging the budget attached to the current thread
pub struct MemoryTracker;

impl MemoryTracker {
    /// Attach `budget` to the current thread until the returned guard is dropped
    pub fn attach(budget: Arc<MemoryBudget>) -> AttachGuard {
        let previous = CURRENT_BUDGET.with(|slot| slot.borrow_mut().replace(budget));
        AttachGuard { previous }
    }

    /// The budget currently attached to this thread, if any
    pub fn current() -> Option<Arc<MemoryBudget>> {
        CURRENT_BUDGET.with(|slot| slot.borrow().clone())
    }

    pub fn is_blocked() -> bool {
        BLOCKER_DEPTH.with(|depth| depth.get() > 0)
    }

    /// Report an allocation made by the current thread
    pub fn alloc(bytes: usize) -> ResourceResult<()> {
        if bytes == 0 || Self::is_blocked() {
            return Ok(());
        }
        match Self::current() {
            Some(budget) => budget.try_alloc(bytes),
            None => Ok(()),
        }
    }

    /// Report memory released by the current thread
    pub fn free(bytes: usize) {
        if bytes == 0 || Self::is_blocked() {
            return;
        }
        if let Some(budget) = Self::current() {
            budget.free(bytes);
        }
    }
}

/// Restores the previously attached budget on drop
#[must_use = "the budget is detached as soon as the guard is dropped"]
pub struct AttachGuard {
    previous: Option<Arc<MemoryBudget>>,
}

impl Drop for AttachGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT_BUDGET.with(|slot| *slot.borrow_mut() = previous);
    }
}

/// Suppresses memory accounting on the current thread while alive
///
/// Blockers nest; accounting resumes once the outermost one is dropped,
/// whichever way the scope is left.
#[must_use = "accounting resumes as soon as the blocker is dropped"]
pub struct MemoryTrackerBlocker {
    _not_send: std::marker::PhantomData<*const ()>,
}

impl MemoryTrackerBlocker {
    pub fn new() -> Self {
        BLOCKER_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self {
            _not_send: std::marker::PhantomData,
        }
    }
}

impl Default for MemoryTrackerBlocker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MemoryTrackerBlocker {
    fn drop(&mut self) {
        BLOCKER_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}
