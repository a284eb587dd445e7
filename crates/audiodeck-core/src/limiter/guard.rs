//! RAII guard that returns an origin slot when dropped.

use std::sync::Arc;

use crate::origin::OriginKey;

use super::Inner;

/// One occupied slot in an origin's queue. Dropping it starts the next
/// pending waiter for the same origin, or frees the slot.
#[derive(Debug)]
pub struct SlotGuard {
    pub(super) inner: Arc<Inner>,
    pub(super) key: OriginKey,
    /// Cleared when a handoff fails and the slot is passed on by the caller.
    pub(super) armed: bool,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        if self.armed {
            Inner::release(&self.inner, &self.key);
        }
    }
}
