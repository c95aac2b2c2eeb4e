/*!
 * Synchronization Primitives
 *
 * Ticketed condition variable coordinating with a caller-owned lock:
 * - `CondVar`: public wait/signal/broadcast surface
 * - `NotifyList`: FIFO waiter queue with ticket counters
 * - `WakeHandle`: one-shot per-waiter park/unpark unit
 * - `CopyGuard`: runtime check against duplicated instances
 *
 * # Architecture
 *
 * The lock is consumed only through the `Lockable` capability, so exclusive
 * mutexes, rwlock writers and rwlock readers all work the same way.
 *
 * # Performance
 *
 * - Lock-free fast path for notify with no waiters
 * - O(1) critical sections, never held while parking
 * - Futex-backed parking via parking_lot_core
 */

mod cond;
mod config;
mod copy_guard;
mod handle;
mod notify;
mod traits;

pub use cond::CondVar;
pub use config::{StrategyType, SyncConfig};
pub use copy_guard::CopyGuard;
pub use handle::WakeHandle;
pub use notify::{NotifyList, NotifySnapshot, Ticket};
pub use traits::{Lockable, ReadLocker, WakeResult};
