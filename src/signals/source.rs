//! # Signal source abstraction and the "last received" slot.
//!
//! A [`SignalSource`] installs OS-level handlers that forward delivered
//! signals into a [`SignalSlot`]. The [`SignalBridge`](crate::SignalBridge)
//! polls that slot.
//!
//! ## Slot semantics
//! The slot is a single atomic cell, **not** a queue: depositing overwrites
//! the previous value (last write wins) and taking clears it. Two different
//! signals arriving inside one poll window collapse into the later one.
//!
//! ## Testing
//! Inject a custom source to avoid touching process-wide OS state:
//! ```rust
//! use eventvisor::{SignalError, SignalNo, SignalSlot, SignalSource};
//!
//! struct Manual;
//!
//! impl SignalSource for Manual {
//!     fn install(&self, _signal: SignalNo, _slot: SignalSlot) -> Result<(), SignalError> {
//!         Ok(()) // tests call `SignalBridge::raise` instead
//!     }
//! }
//! ```

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Weak};

use crate::error::SignalError;
use crate::events::SignalNo;

/// Shared "last received signal" cell. `0` means empty.
#[derive(Clone, Debug, Default)]
pub struct SignalSlot {
    cell: Arc<AtomicI32>,
}

impl SignalSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `signal`, overwriting any value not yet taken. `0` is ignored.
    #[inline]
    pub fn deposit(&self, signal: SignalNo) {
        if signal != 0 {
            self.cell.store(signal, Ordering::Release);
        }
    }

    /// Atomically reads and clears the slot; `None` if empty.
    #[inline]
    pub fn take(&self) -> Option<SignalNo> {
        match self.cell.swap(0, Ordering::AcqRel) {
            0 => None,
            n => Some(n),
        }
    }

    /// Current value without clearing it; `None` if empty.
    #[inline]
    pub fn peek(&self) -> Option<SignalNo> {
        match self.cell.load(Ordering::Acquire) {
            0 => None,
            n => Some(n),
        }
    }

    /// Non-owning reference to the same cell.
    pub fn downgrade(&self) -> WeakSignalSlot {
        WeakSignalSlot {
            cell: Arc::downgrade(&self.cell),
        }
    }
}

/// Non-owning [`SignalSlot`] reference, for forwarders that must not keep the slot alive.
#[derive(Clone, Debug, Default)]
pub struct WeakSignalSlot {
    cell: Weak<AtomicI32>,
}

impl WeakSignalSlot {
    /// The slot, if any owner still holds it.
    pub fn upgrade(&self) -> Option<SignalSlot> {
        self.cell.upgrade().map(|cell| SignalSlot { cell })
    }
}

/// Installs handlers that forward delivered signals into a slot.
pub trait SignalSource: Send + Sync + 'static {
    /// Starts forwarding `signal` into `slot`.
    ///
    /// Called at most once per signal number per bridge. Must be called from
    /// within a tokio runtime.
    fn install(&self, signal: SignalNo, slot: SignalSlot) -> Result<(), SignalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let slot = SignalSlot::new();
        slot.deposit(10);
        slot.deposit(12);
        assert_eq!(slot.peek(), Some(12));
        assert_eq!(slot.take(), Some(12));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_zero_is_ignored() {
        let slot = SignalSlot::new();
        slot.deposit(3);
        slot.deposit(0);
        assert_eq!(slot.take(), Some(3));
    }

    #[test]
    fn test_weak_slot_does_not_keep_cell_alive() {
        let slot = SignalSlot::new();
        let weak = slot.downgrade();

        weak.upgrade().expect("owner alive").deposit(2);
        assert_eq!(slot.take(), Some(2));

        drop(slot);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_clones_share_the_cell() {
        let slot = SignalSlot::new();
        slot.clone().deposit(15);
        assert_eq!(slot.take(), Some(15));
    }
}
