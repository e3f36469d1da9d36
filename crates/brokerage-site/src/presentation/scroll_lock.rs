use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::trace;

/// Page scroll lock shared by every overlay on a page.
///
/// Scrolling is disabled while at least one [`ScrollLockGuard`] is alive. Guards release on
/// drop, so an overlay torn down without an explicit close still gives the page back.
#[derive(Debug, Clone, Default)]
pub struct ScrollLock {
    holders: Arc<AtomicUsize>,
}

impl ScrollLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> ScrollLockGuard {
        let previous = self.holders.fetch_add(1, Ordering::AcqRel);
        trace!(holders = previous + 1, "scroll lock acquired");
        ScrollLockGuard {
            holders: self.holders.clone(),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.holders.load(Ordering::Acquire) > 0
    }

    pub fn holders(&self) -> usize {
        self.holders.load(Ordering::Acquire)
    }
}

/// Proof that scrolling is locked; dropping it releases the hold.
#[derive(Debug)]
#[must_use = "the scroll lock is released as soon as the guard is dropped"]
pub struct ScrollLockGuard {
    holders: Arc<AtomicUsize>,
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        let previous = self.holders.fetch_sub(1, Ordering::AcqRel);
        trace!(holders = previous - 1, "scroll lock released");
    }
}
