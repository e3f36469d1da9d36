use super::scroll_lock::{ScrollLock, ScrollLockGuard};

/// An open modal (for example a team member's bio) holding the page scroll lock.
///
/// The lock is held exactly as long as the modal is visible: [`ModalHandle::close`] and drop
/// both release it.
#[derive(Debug)]
pub struct ModalHandle<T> {
    content: T,
    _scroll: ScrollLockGuard,
}

impl<T> ModalHandle<T> {
    pub fn open(content: T, lock: &ScrollLock) -> Self {
        Self {
            content,
            _scroll: lock.acquire(),
        }
    }

    pub fn content(&self) -> &T {
        &self.content
    }

    /// Hides the modal, handing back what it displayed.
    pub fn close(self) -> T {
        self.content
    }
}
