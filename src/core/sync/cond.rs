/*!
 * Condition Variable
 *
 * Rendezvous point for threads waiting on a condition guarded by a
 * caller-owned lock.
 *
 * # Guarantees
 *
 * - `signal` wakes waiters strictly in arrival order
 * - `broadcast` wakes exactly the waiters registered before it
 * - A notification issued after a waiter registered is never lost
 * - `wait` never returns without a notification
 */

use super::config::SyncConfig;
use super::copy_guard::CopyGuard;
use super::notify::{NotifyList, NotifySnapshot};
use super::traits::{Lockable, WakeResult};
use std::fmt;
use tracing::{error, instrument, Span};

/// Condition variable bound to a caller-supplied lock
///
/// ```rust
/// use ai_os_condvar::core::sync::{CondVar, Lockable};
/// use parking_lot::lock_api::RawMutex as _;
/// use parking_lot::RawMutex;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// let lock = RawMutex::INIT;
/// let cond = CondVar::new(&lock);
/// let ready = AtomicBool::new(true);
///
/// lock.acquire();
/// while !ready.load(Ordering::Acquire) {
///     // SAFETY: `lock` is held here
///     unsafe { cond.wait() };
/// }
/// unsafe { lock.release() };
/// ```
///
/// `L` is usually a reference or an `Arc` to the lock, so the caller keeps
/// ownership and can lock and unlock it around its own condition checks.
///
/// Once any method has been called the value must stay where it is. Share
/// it through `Arc` or a reference; a duplicated instance panics on use.
pub struct CondVar<L: Lockable> {
    lock: L,
    notify: NotifyList,
    guard: CopyGuard,
}

impl<L: Lockable> CondVar<L> {
    /// Bind a condition variable to `lock`
    pub fn new(lock: L) -> Self {
        Self::with_config(lock, SyncConfig::default())
    }

    /// Bind a condition variable to `lock` with a specific park strategy
    pub fn with_config(lock: L, config: SyncConfig) -> Self {
        Self {
            lock,
            notify: NotifyList::with_config(config),
            guard: CopyGuard::new(),
        }
    }

    /// The lock this condition variable releases and reacquires
    #[inline]
    pub fn lock(&self) -> &L {
        &self.lock
    }

    /// Release the lock, block until notified, then reacquire the lock
    ///
    /// The waiter is registered before the lock is released, so a notify
    /// from a thread that took the lock afterwards always reaches it. The
    /// lock is held again on return whichever notification woke us. The
    /// condition itself may still be false; re-check it in a loop.
    ///
    /// # Safety
    ///
    /// The calling context must hold `lock`.
    ///
    /// # Panics
    ///
    /// If this instance was duplicated after first use.
    #[instrument(level = "trace", name = "condvar_wait", skip_all, fields(ticket = tracing::field::Empty))]
    pub unsafe fn wait(&self) {
        self.assert_not_copied();

        let ticket = self.notify.add();
        Span::current().record("ticket", ticket.id());
        // SAFETY: the caller holds the lock
        unsafe { self.lock.release() };
        self.notify.wait(ticket);
        self.lock.acquire();
    }

    /// Wake the longest-waiting thread, if any
    ///
    /// Holding the lock is not required.
    ///
    /// # Panics
    ///
    /// If this instance was duplicated after first use.
    pub fn signal(&self) -> WakeResult {
        self.assert_not_copied();
        self.notify.notify_one()
    }

    /// Wake every thread currently waiting
    ///
    /// Threads that start waiting after this call are not affected.
    ///
    /// # Panics
    ///
    /// If this instance was duplicated after first use.
    pub fn broadcast(&self) -> WakeResult {
        self.assert_not_copied();
        self.notify.notify_all()
    }

    /// Number of threads registered and not yet woken
    pub fn waiters(&self) -> u64 {
        self.notify.pending()
    }

    /// Counter snapshot for diagnostics
    pub fn snapshot(&self) -> NotifySnapshot {
        self.notify.snapshot()
    }

    #[inline]
    fn assert_not_copied(&self) {
        if let Err(err) = self.guard.check() {
            error!(error = %err, "condition variable misuse");
            panic!("{err}");
        }
    }
}

impl<L: Lockable> fmt::Debug for CondVar<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CondVar")
            .field("notify", &self.notify.snapshot())
            .field("origin", &self.guard.origin())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sync::ReadLocker;
    use parking_lot::lock_api::{RawMutex as _, RawRwLock as _};
    use parking_lot::{RawMutex, RawRwLock};
    use std::mem::ManuallyDrop;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_signal_wakes_waiter_with_lock_held() {
        let lock = Arc::new(RawMutex::INIT);
        let cond = Arc::new(CondVar::new(lock.clone()));
        let ready = Arc::new(AtomicBool::new(false));

        let (lock_c, cond_c, ready_c) = (lock.clone(), cond.clone(), ready.clone());
        let waiter = thread::spawn(move || {
            lock_c.acquire();
            while !ready_c.load(Ordering::Acquire) {
                unsafe { cond_c.wait() };
            }
            let held = lock_c.is_locked();
            unsafe { Lockable::release(&lock_c) };
            held
        });

        // Give thread time to wait
        thread::sleep(Duration::from_millis(50));

        lock.acquire();
        ready.store(true, Ordering::Release);
        unsafe { Lockable::release(&lock) };
        cond.signal();

        assert!(waiter.join().unwrap());
    }

    #[test]
    fn test_notify_without_waiters_is_noop() {
        let lock = RawMutex::INIT;
        let cond = CondVar::new(&lock);

        assert_eq!(cond.signal(), WakeResult::NoWaiters);
        assert_eq!(cond.broadcast(), WakeResult::NoWaiters);

        let snap = cond.snapshot();
        assert_eq!(snap.wait_count, snap.notify_count);
        assert_eq!(cond.waiters(), 0);
    }

    #[test]
    fn test_lock_accessor_returns_bound_lock() {
        let lock = RawMutex::INIT;
        let cond = CondVar::new(&lock);
        assert!(std::ptr::eq(*cond.lock(), &lock));
    }

    #[test]
    #[should_panic(expected = "copied")]
    fn test_duplicated_condvar_panics() {
        let lock = RawMutex::INIT;
        let cond = Box::new(CondVar::new(&lock));
        cond.signal();

        let duplicate = ManuallyDrop::new(Box::new(unsafe { std::ptr::read(&*cond) }));
        duplicate.signal();
    }

    #[test]
    fn test_duplicated_wait_fails_before_touching_state() {
        let lock = RawMutex::INIT;
        let cond = Box::new(CondVar::new(&lock));
        cond.signal();

        let duplicate = ManuallyDrop::new(Box::new(unsafe { std::ptr::read(&*cond) }));

        lock.acquire();
        let result = panic::catch_unwind(AssertUnwindSafe(|| unsafe { duplicate.wait() }));
        assert!(result.is_err());

        // Lock was never released and nothing registered
        assert!(lock.is_locked());
        let untouched = NotifySnapshot {
            wait_count: 0,
            notify_count: 0,
            pending: 0,
        };
        assert_eq!(duplicate.snapshot(), untouched);
        assert_eq!(cond.snapshot(), untouched);

        unsafe { Lockable::release(&lock) };
    }

    #[test]
    #[should_panic(expected = "copied")]
    fn test_moved_after_use_panics() {
        let lock = RawMutex::INIT;
        let cond = CondVar::new(&lock);
        cond.signal();

        let moved = Box::new(cond);
        moved.signal();
    }

    #[test]
    fn test_moved_before_use_is_fine() {
        let lock = RawMutex::INIT;
        let cond = CondVar::new(&lock);
        let moved = Box::new(cond);
        assert_eq!(moved.broadcast(), WakeResult::NoWaiters);
    }

    #[test]
    fn test_shared_lock_waiter() {
        let rw: &'static RawRwLock = Box::leak(Box::new(RawRwLock::INIT));
        let cond = Arc::new(CondVar::new(ReadLocker::new(rw)));
        let ready = Arc::new(AtomicBool::new(false));

        let (cond_c, ready_c) = (cond.clone(), ready.clone());
        let waiter = thread::spawn(move || {
            let reader = *cond_c.lock();
            reader.acquire();
            while !ready_c.load(Ordering::Acquire) {
                unsafe { cond_c.wait() };
            }
            unsafe { reader.release() };
        });

        while cond.waiters() == 0 {
            thread::yield_now();
        }

        // The waiter released its read lock before parking
        rw.lock_exclusive();
        ready.store(true, Ordering::Release);
        unsafe { rw.unlock_exclusive() };
        cond.signal();

        waiter.join().unwrap();
    }

    #[test]
    fn test_debug_output() {
        let lock = RawMutex::INIT;
        let cond = CondVar::new(&lock);
        cond.signal();
        let out = format!("{cond:?}");
        assert!(out.contains("CondVar"));
        assert!(out.contains("wait_count: 0"));
    }
}
