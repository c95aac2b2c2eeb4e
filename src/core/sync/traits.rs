/*!
 * Synchronization Traits
 *
 * Core abstractions shared by the condition variable and its wait queue.
 *
 * # Design: Lock as a Capability
 *
 * The condition variable never owns the lock it coordinates with. It only
 * needs to release it before suspending and reacquire it afterwards, so the
 * caller hands it anything implementing [`Lockable`]: an exclusive mutex,
 * the write side of a rwlock, or the read side through [`ReadLocker`].
 */

use parking_lot::lock_api::{RawMutex as _, RawRwLock as _};
use parking_lot::{RawMutex, RawRwLock};
use std::fmt;
use std::sync::Arc;

/// Result of a wake operation
///
/// Compact representation (single usize) for efficient returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeResult {
    /// Successfully woke N waiters (N >= 1)
    Woken(usize),
    /// No waiters were waiting
    NoWaiters,
}

impl WakeResult {
    /// Check if any waiters were woken
    #[inline(always)]
    pub fn is_woken(&self) -> bool {
        matches!(self, WakeResult::Woken(_))
    }

    /// Get number of woken waiters (0 if none)
    #[inline(always)]
    pub fn count(&self) -> usize {
        match self {
            WakeResult::Woken(n) => *n,
            WakeResult::NoWaiters => 0,
        }
    }

    #[inline]
    pub(crate) fn from_count(n: usize) -> Self {
        if n == 0 {
            WakeResult::NoWaiters
        } else {
            WakeResult::Woken(n)
        }
    }
}

/// Acquire/release capability for a caller-owned lock
///
/// Implementations must be:
/// - **Thread-safe**: `acquire` may be called from any thread
/// - **Blocking**: `acquire` returns only once the lock is held
///
/// Exclusive and shared locks are both valid; the condition variable does
/// not care which side of a lock it is given.
pub trait Lockable: Send + Sync {
    /// Block until the lock is held by the calling context
    fn acquire(&self);

    /// Release the lock
    ///
    /// # Safety
    ///
    /// The lock must be held by the calling context.
    unsafe fn release(&self);
}

impl Lockable for RawMutex {
    #[inline]
    fn acquire(&self) {
        self.lock();
    }

    #[inline]
    unsafe fn release(&self) {
        // SAFETY: forwarded from the caller
        unsafe { self.unlock() }
    }
}

/// A raw rwlock used directly locks its exclusive (writer) side
impl Lockable for RawRwLock {
    #[inline]
    fn acquire(&self) {
        self.lock_exclusive();
    }

    #[inline]
    unsafe fn release(&self) {
        // SAFETY: forwarded from the caller
        unsafe { self.unlock_exclusive() }
    }
}

/// Shared (reader) side of a [`RawRwLock`] as a [`Lockable`]
///
/// Lets readers wait on a condition while other readers keep running.
#[derive(Clone, Copy)]
pub struct ReadLocker<'a> {
    rw: &'a RawRwLock,
}

impl<'a> ReadLocker<'a> {
    /// Wrap the shared side of `rw`
    pub fn new(rw: &'a RawRwLock) -> Self {
        Self { rw }
    }

    /// The underlying rwlock
    pub fn inner(&self) -> &'a RawRwLock {
        self.rw
    }
}

impl fmt::Debug for ReadLocker<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadLocker")
            .field("rw", &(self.rw as *const RawRwLock))
            .finish()
    }
}

impl Lockable for ReadLocker<'_> {
    #[inline]
    fn acquire(&self) {
        self.rw.lock_shared();
    }

    #[inline]
    unsafe fn release(&self) {
        // SAFETY: forwarded from the caller
        unsafe { self.rw.unlock_shared() }
    }
}

impl<T: Lockable + ?Sized> Lockable for &T {
    #[inline]
    fn acquire(&self) {
        (**self).acquire();
    }

    #[inline]
    unsafe fn release(&self) {
        // SAFETY: forwarded from the caller
        unsafe { (**self).release() }
    }
}

impl<T: Lockable + ?Sized> Lockable for Arc<T> {
    #[inline]
    fn acquire(&self) {
        (**self).acquire();
    }

    #[inline]
    unsafe fn release(&self) {
        // SAFETY: forwarded from the caller
        unsafe { (**self).release() }
    }
}
