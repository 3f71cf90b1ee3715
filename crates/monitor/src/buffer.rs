//! Most-recent-wins shared slot

use std::sync::Mutex;

/// Single-value exchange buffer between two loops.
///
/// Writers replace whatever is present; readers swap the value out.
/// The lock is held only for the swap, never across a detection call.
pub struct SharedSlot<T> {
    slot: Mutex<Option<T>>,
}

impl<T> SharedSlot<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Deposit a value, discarding any unconsumed predecessor.
    pub fn publish(&self, value: T) {
        let mut slot = self.slot.lock().unwrap();
        *slot = Some(value);
    }

    /// Swap the current value out, leaving the slot empty.
    pub fn take(&self) -> Option<T> {
        let mut slot = self.slot.lock().unwrap();
        slot.take()
    }
}

impl<T> Default for SharedSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
