//! Page-level side effects owned by overlays such as the team-member modal.

pub mod modal;
pub mod scroll_lock;

pub use modal::ModalHandle;
pub use scroll_lock::{ScrollLock, ScrollLockGuard};
