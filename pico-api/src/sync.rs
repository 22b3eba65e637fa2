//! Synchronization primitives for the shim
//!
//! The VFS uses [`VfsLock`] internally for its table critical sections and
//! offers the same primitive to drivers that need their own.

pub use spin::{Mutex, MutexGuard, Once, RwLock};
pub use core::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// Short-critical-section lock (init / acquire / release)
pub struct VfsLock {
    inner: Mutex<()>,
}

/// Proof that a [`VfsLock`] is held; dropping it releases the lock
pub struct VfsLockGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl VfsLock {
    /// Initialise a lock in the released state
    pub const fn new() -> Self {
        Self { inner: Mutex::new(()) }
    }

    /// Acquire the lock, spinning until it is free
    pub fn acquire(&self) -> VfsLockGuard<'_> {
        VfsLockGuard {
            _guard: self.inner.lock(),
        }
    }

    /// Acquire the lock only if it is currently free
    pub fn try_acquire(&self) -> Option<VfsLockGuard<'_>> {
        self.inner.try_lock().map(|guard| VfsLockGuard { _guard: guard })
    }

    /// Release a held lock
    pub fn release(guard: VfsLockGuard<'_>) {
        drop(guard);
    }

    /// Whether the lock is currently held by anyone
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }
}

impl Default for VfsLock {
    fn default() -> Self {
        Self::new()
    }
}
