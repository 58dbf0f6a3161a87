//! The auto-loop controller slot.
//!
//! At most one auto loop is active. Installing a new controller cancels the
//! previous one (cancel-and-replace), and a loop that exits only clears the
//! slot when the slot still holds its own generation, so a replaced loop can
//! never evict its successor.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Handle to one auto loop.
///
/// Clones share the same cancellation token.
#[derive(Debug, Clone)]
pub struct AutoLoopController {
    generation: u64,
    run_id: Uuid,
    token: CancellationToken,
}

impl AutoLoopController {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Identifier used to correlate log lines of one loop.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Single-writer slot holding the active controller.
///
/// The mutex is only held for swaps, never across an await.
#[derive(Debug, Default)]
pub struct ControllerSlot {
    current: Mutex<Option<AutoLoopController>>,
    next_generation: AtomicU64,
}

impl ControllerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fresh controller, cancelling any loop that is still running.
    ///
    /// Returns the new controller and the one it replaced, if any.
    pub fn install(&self) -> (AutoLoopController, Option<AutoLoopController>) {
        let controller = AutoLoopController {
            generation: self.next_generation.fetch_add(1, Ordering::Relaxed) + 1,
            run_id: Uuid::now_v7(),
            token: CancellationToken::new(),
        };

        let previous = self.lock().replace(controller.clone());
        if let Some(ref prev) = previous {
            prev.cancel();
        }
        (controller, previous)
    }

    /// Cancel and clear the active controller. Returns whether one was active.
    pub fn stop(&self) -> bool {
        match self.lock().take() {
            Some(controller) => {
                controller.cancel();
                true
            }
            None => false,
        }
    }

    /// Clear the slot if it still holds `generation`.
    pub fn release(&self, generation: u64) -> bool {
        let mut current = self.lock();
        if current.as_ref().map(|c| c.generation) == Some(generation) {
            *current = None;
            true
        } else {
            false
        }
    }

    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }

    /// The active controller, if any.
    pub fn current(&self) -> Option<AutoLoopController> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<AutoLoopController>> {
        // A poisoned slot still holds a valid Option; keep using it.
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_on_empty_slot_is_noop() {
        let slot = ControllerSlot::new();
        assert!(!slot.stop());
        assert!(!slot.stop());
        assert!(!slot.is_active());
    }

    #[test]
    fn test_install_then_stop_cancels() {
        let slot = ControllerSlot::new();
        let (controller, previous) = slot.install();
        assert!(previous.is_none());
        assert!(slot.is_active());

        assert!(slot.stop());
        assert!(controller.is_cancelled());
        assert!(!slot.is_active());
    }

    #[test]
    fn test_install_replaces_and_cancels_previous() {
        let slot = ControllerSlot::new();
        let (first, _) = slot.install();
        let (second, previous) = slot.install();

        assert_eq!(previous.unwrap().generation(), first.generation());
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(second.generation() > first.generation());
        assert_eq!(slot.current().unwrap().generation(), second.generation());
    }

    #[test]
    fn test_stale_release_keeps_successor() {
        let slot = ControllerSlot::new();
        let (first, _) = slot.install();
        let (second, _) = slot.install();

        assert!(!slot.release(first.generation()));
        assert!(slot.is_active());

        assert!(slot.release(second.generation()));
        assert!(!slot.is_active());
    }
}
