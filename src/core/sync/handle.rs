/*!
 * One-Shot Wake Handle
 *
 * Per-waiter park/unpark unit built on parking_lot_core.
 *
 * # Design
 *
 * Each handle parks on its own address, so an unpark can only ever reach
 * the waiter that owns the handle. The notified flag is checked inside the
 * park validation callback, which runs under the parking bucket lock:
 * - wake before park: validation fails, the waiter never sleeps
 * - wake after park: the waiter is already queued and gets unparked
 *
 * The handle is one-shot. Once notified it stays notified.
 */

use super::config::SyncConfig;
use parking_lot_core::{park, unpark_one, ParkResult, DEFAULT_PARK_TOKEN, DEFAULT_UNPARK_TOKEN};
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread;
use std::time::Instant;

const EMPTY: u8 = 0;
const NOTIFIED: u8 = 1;

/// One-shot blocking/resume primitive bound to a single waiter
#[repr(C, align(64))] // Cache-line aligned to prevent false sharing
#[derive(Debug)]
pub struct WakeHandle {
    state: AtomicU8,
}

impl WakeHandle {
    /// Create a handle in the not-yet-notified state
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(EMPTY),
        }
    }

    /// Whether `wake` has been called
    #[inline(always)]
    pub fn is_notified(&self) -> bool {
        self.state.load(Ordering::Acquire) == NOTIFIED
    }

    /// Stable parking key for this handle
    #[inline(always)]
    fn addr(&self) -> usize {
        &self.state as *const AtomicU8 as usize
    }

    /// Block the calling thread until `wake` is called
    ///
    /// Returns immediately if the handle was already notified.
    pub fn wait(&self, config: &SyncConfig) {
        if config.spins() && self.spin(config) {
            return;
        }

        let addr = self.addr();
        while !self.is_notified() {
            // SAFETY: the validate callback only reads an atomic, does not
            // panic and does not call into parking_lot.
            let result = unsafe {
                park(
                    addr,
                    || !self.is_notified(),
                    || {},
                    |_, _| {},
                    DEFAULT_PARK_TOKEN,
                    None,
                )
            };

            // Invalid means we were notified between the loop check and
            // validation; either way the loop condition decides.
            debug_assert_ne!(result, ParkResult::TimedOut);
        }
    }

    /// Mark the handle notified and unpark its waiter
    ///
    /// Returns `false` if the handle had already been woken, in which case
    /// nothing happens.
    pub fn wake(&self) -> bool {
        if self.state.swap(NOTIFIED, Ordering::AcqRel) == NOTIFIED {
            return false;
        }

        // SAFETY: the address is only used as a parking key and the
        // callback does not touch parking_lot.
        unsafe {
            unpark_one(self.addr(), |_| DEFAULT_UNPARK_TOKEN);
        }
        true
    }

    /// Adaptive spin before parking
    ///
    /// Returns true if the handle was notified while spinning
    fn spin(&self, config: &SyncConfig) -> bool {
        let start = Instant::now();
        let mut spin_count: u32 = 0;

        loop {
            if self.is_notified() {
                return true;
            }

            if start.elapsed() >= config.spin_duration || spin_count >= config.max_spins {
                return false;
            }

            // Yield to scheduler occasionally
            if spin_count % 10 == 0 {
                thread::yield_now();
            } else {
                std::hint::spin_loop();
            }

            spin_count += 1;
        }
    }
}

impl Default for WakeHandle {
    fn default() -> Self {
        Self::new()
    }
}
