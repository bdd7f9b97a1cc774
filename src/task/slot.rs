use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Single-slot occupancy flag for one command kind.
///
/// A trigger that cannot acquire the slot is rejected; nothing is queued.
/// Clones share the same flag.
#[derive(Debug, Clone)]
pub struct InFlightSlot {
    name: &'static str,
    busy: Arc<AtomicBool>,
}

impl InFlightSlot {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Occupy the slot, or `None` if it is already occupied.
    pub fn try_acquire(&self) -> Option<SlotGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| {
                trace!(slot = self.name, "slot acquired");
                SlotGuard {
                    name: self.name,
                    busy: Arc::clone(&self.busy),
                }
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Occupancy of an [`InFlightSlot`]; the slot is released when this drops.
///
/// Move the guard into the background work so the slot covers the whole
/// lifetime of the work, not just the caller's wait.
#[must_use = "the slot is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct SlotGuard {
    name: &'static str,
    busy: Arc<AtomicBool>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
        trace!(slot = self.name, "slot released");
    }
}
