/*!
 * Copy Guard
 *
 * Runtime assertion that a primitive is still used from the address it was
 * first used at. Rust never copies a non-`Copy` value implicitly, but its
 * bytes can still be duplicated (`ptr::read`, `mem::transmute_copy`, FFI)
 * or moved after waiters have seen it. Either way the copy would carry a
 * private snapshot of the wait queue, so it is rejected here instead of
 * silently losing wakeups.
 */

use crate::core::errors::{SyncError, SyncResult};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Identity slot claimed on first use
#[derive(Debug, Default)]
pub struct CopyGuard {
    /// Address of this guard at first use, 0 until then
    origin: AtomicUsize,
}

impl CopyGuard {
    /// Create an unclaimed guard
    pub const fn new() -> Self {
        Self {
            origin: AtomicUsize::new(0),
        }
    }

    #[inline(always)]
    fn addr(&self) -> usize {
        self as *const Self as usize
    }

    /// Verify the guard still lives where it was first used
    ///
    /// The first call claims the current address. Concurrent first calls
    /// race on a compare-and-set; all of them observe the same winner.
    ///
    /// Any address change after first use fails, including an ordinary
    /// move of the owning value (`Box::new(value)`, returning it by value).
    /// Only a move before the first `check` is accepted.
    #[inline]
    pub fn check(&self) -> SyncResult<()> {
        let here = self.addr();
        let seen = self.origin.load(Ordering::Acquire);
        if seen == here {
            return Ok(());
        }

        if seen == 0 {
            match self
                .origin
                .compare_exchange(0, here, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return Ok(()),
                Err(current) if current == here => return Ok(()),
                Err(current) => {
                    return Err(SyncError::Misuse {
                        expected: current,
                        found: here,
                    })
                }
            }
        }

        Err(SyncError::Misuse {
            expected: seen,
            found: here,
        })
    }

    /// Address claimed at first use, if any
    pub fn origin(&self) -> Option<usize> {
        match self.origin.load(Ordering::Acquire) {
            0 => None,
            addr => Some(addr),
        }
    }
}
