//! Per-thread reentrancy protection for the render path.

use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    static RENDERING: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as rendering a line.
///
/// Anything reached from the render path that logs again (a terminal query,
/// a resolver, the crate's own diagnostics) finds the flag set and is
/// dropped instead of recursing. The flag is cleared when the guard drops,
/// including during unwinding.
#[derive(Debug)]
pub struct ReentrancyGuard {
    // Tied to the thread whose flag it clears.
    _not_send: PhantomData<*const ()>,
}

impl ReentrancyGuard {
    /// Returns `None` if this thread already holds a guard.
    pub fn enter() -> Option<Self> {
        RENDERING.with(|flag| {
            if flag.replace(true) {
                None
            } else {
                Some(ReentrancyGuard {
                    _not_send: PhantomData,
                })
            }
        })
    }

    /// Whether the current thread is inside the render path.
    pub fn is_active() -> bool {
        RENDERING.with(Cell::get)
    }
}

impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        RENDERING.with(|flag| flag.set(false));
    }
}
