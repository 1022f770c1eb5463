//! Per-thread latch that refuses nested `add` calls
//!
//! Adding an event can log, and logging can add an event (see
//! `TextLogBridge`). One latch is shared by every queue on a thread, so a
//! nested add into any queue is refused.

use std::cell::Cell;

thread_local! {
    static INSIDE_ADD: Cell<bool> = const { Cell::new(false) };
}

/// Held for the duration of one `add`; cleared on drop
#[must_use]
pub(crate) struct AddGuard {
    _not_send: std::marker::PhantomData<*const ()>,
}

impl AddGuard {
    /// Set the latch, or return `None` if this thread is already inside `add`
    pub(crate) fn enter() -> Option<Self> {
        INSIDE_ADD.with(|inside| {
            if inside.replace(true) {
                None
            } else {
                Some(Self {
                    _not_send: std::marker::PhantomData,
                })
            }
        })
    }
}

impl Drop for AddGuard {
    fn drop(&mut self) {
        INSIDE_ADD.with(|inside| inside.set(false));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_enter_is_refused() {
        let outer = AddGuard::enter();
        assert!(outer.is_some());
        assert!(AddGuard::enter().is_none());

        drop(outer);
        assert!(AddGuard::enter().is_some());
    }

    #[test]
    fn test_latch_cleared_on_unwind() {
        let result = std::panic::catch_unwind(|| {
            let _guard = AddGuard::enter().unwrap();
            panic!("unwind while inside add");
        });

        assert!(result.is_err());
        assert!(AddGuard::enter().is_some());
    }

    #[test]
    fn test_latch_is_per_thread() {
        let _guard = AddGuard::enter().unwrap();

        let entered_elsewhere = std::thread::spawn(|| AddGuard::enter().is_some())
            .join()
            .unwrap();
        assert!(entered_elsewhere);
    }
}
