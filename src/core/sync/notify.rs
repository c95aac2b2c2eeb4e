/*!
 * Notify List
 *
 * Ticketed FIFO wait queue behind the condition variable.
 *
 * # Design: Tickets Over Generations
 *
 * Every registration takes the next `wait_count` value as its ticket and is
 * linked at the queue tail in the same critical section, so queue order is
 * ticket order. `notify_count` is the next ticket due for a wakeup:
 * - `notify_count == wait_count`: nobody is pending (lock-free fast path)
 * - `notify_one` wakes ticket `notify_count` and advances it by one
 * - `notify_all` detaches the whole queue and jumps to `wait_count`
 *
 * Wakeups happen after the internal lock is dropped. A waiter's handle is
 * one-shot, so a wakeup that lands before the waiter parks is never lost.
 */

use super::config::SyncConfig;
use super::handle::WakeHandle;
use super::traits::WakeResult;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Queued waiter
#[derive(Debug)]
struct Waiter {
    ticket: u64,
    handle: Arc<WakeHandle>,
}

/// Receipt for a registration
///
/// Handed back by [`NotifyList::add`] and consumed by [`NotifyList::wait`],
/// so each registration is waited on at most once.
#[derive(Debug)]
#[must_use = "a registered waiter must be waited on"]
pub struct Ticket {
    id: u64,
    handle: Arc<WakeHandle>,
}

impl Ticket {
    /// Position in the wake order
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether a notifier has already picked this ticket
    #[inline]
    pub fn is_notified(&self) -> bool {
        self.handle.is_notified()
    }
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotifySnapshot {
    /// Tickets issued so far
    pub wait_count: u64,
    /// Tickets woken so far
    pub notify_count: u64,
    /// Registered but not yet woken
    pub pending: u64,
}

/// FIFO waiter queue plus ticket counters
///
/// # Performance
///
/// - O(1) registration and single wakeup (queue head is always next)
/// - O(1) detach-all for broadcast
/// - No locking when nobody is waiting
#[derive(Debug)]
pub struct NotifyList {
    /// Next ticket to hand out
    wait_count: AtomicU64,
    /// Next ticket to wake
    notify_count: AtomicU64,
    /// Waiters in ticket order; counters only change while this is held
    queue: Mutex<VecDeque<Waiter>>,
    config: SyncConfig,
}

impl NotifyList {
    /// Create an empty list with the default park strategy
    pub fn new() -> Self {
        Self::with_config(SyncConfig::default())
    }

    /// Create an empty list with a specific park strategy
    pub fn with_config(config: SyncConfig) -> Self {
        Self {
            wait_count: AtomicU64::new(0),
            notify_count: AtomicU64::new(0),
            queue: Mutex::new(VecDeque::new()),
            config,
        }
    }

    /// Park strategy handed to every waiter
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Register a waiter and return its ticket
    ///
    /// Ticket issuance and queue linkage happen under one critical section,
    /// so any notify that starts after this returns will see the waiter.
    pub fn add(&self) -> Ticket {
        let handle = Arc::new(WakeHandle::new());

        let mut queue = self.queue.lock();
        let ticket = self.wait_count.fetch_add(1, Ordering::AcqRel);
        queue.push_back(Waiter {
            ticket,
            handle: handle.clone(),
        });
        drop(queue);

        trace!(ticket, "waiter registered");
        Ticket { id: ticket, handle }
    }

    /// Block until `ticket` is woken by `notify_one` or `notify_all`
    ///
    /// Returns immediately if that already happened.
    pub fn wait(&self, ticket: Ticket) {
        ticket.handle.wait(&self.config);
        trace!(ticket = ticket.id, "waiter resumed");
    }

    /// Wake the waiter holding the lowest outstanding ticket
    pub fn notify_one(&self) -> WakeResult {
        // Fast path: nothing pending, no lock
        if self.notify_count.load(Ordering::Acquire) == self.wait_count.load(Ordering::Acquire) {
            return WakeResult::NoWaiters;
        }

        let mut queue = self.queue.lock();
        let ticket = self.notify_count.load(Ordering::Acquire);
        if ticket == self.wait_count.load(Ordering::Acquire) {
            // Another notifier got there first
            return WakeResult::NoWaiters;
        }
        self.notify_count.store(ticket + 1, Ordering::Release);

        // Queue is ticket-ordered, so this is the head in practice
        let position = queue.iter().position(|w| w.ticket == ticket);
        let waiter = match position {
            Some(0) => queue.pop_front(),
            Some(idx) => queue.remove(idx),
            None => None,
        };
        drop(queue);

        // Every ticket below wait_count stays queued until it is woken
        let Some(waiter) = waiter else {
            return WakeResult::NoWaiters;
        };

        trace!(ticket, "waking waiter");
        waiter.handle.wake();
        WakeResult::Woken(1)
    }

    /// Wake every waiter registered before this call
    pub fn notify_all(&self) -> WakeResult {
        if self.notify_count.load(Ordering::Acquire) == self.wait_count.load(Ordering::Acquire) {
            return WakeResult::NoWaiters;
        }

        let detached = {
            let mut queue = self.queue.lock();
            self.notify_count
                .store(self.wait_count.load(Ordering::Acquire), Ordering::Release);
            std::mem::take(&mut *queue)
        };

        let woken = detached.len();
        trace!(woken, "waking all waiters");
        for waiter in detached {
            waiter.handle.wake();
        }

        WakeResult::from_count(woken)
    }

    /// Number of registered waiters not yet woken
    pub fn pending(&self) -> u64 {
        self.snapshot().pending
    }

    /// Whether no waiter is pending
    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }

    /// Consistent view of both counters
    pub fn snapshot(&self) -> NotifySnapshot {
        let _queue = self.queue.lock();
        let wait_count = self.wait_count.load(Ordering::Acquire);
        let notify_count = self.notify_count.load(Ordering::Acquire);
        NotifySnapshot {
            wait_count,
            notify_count,
            pending: wait_count - notify_count,
        }
    }
}

impl Default for NotifyList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sync::StrategyType;
    use pretty_assertions::assert_eq;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_tickets_increase_by_one() {
        let list = NotifyList::new();
        let tickets: Vec<_> = (0..5).map(|_| list.add()).collect();
        let ids: Vec<_> = tickets.iter().map(Ticket::id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        list.notify_all();
    }

    #[test]
    fn test_notify_one_is_fifo() {
        let list = NotifyList::new();
        let t0 = list.add();
        let t1 = list.add();
        let t2 = list.add();

        assert_eq!(list.notify_one(), WakeResult::Woken(1));
        assert!(t0.is_notified());
        assert!(!t1.is_notified());

        assert_eq!(list.notify_one(), WakeResult::Woken(1));
        assert!(t1.is_notified());
        assert!(!t2.is_notified());

        assert_eq!(list.pending(), 1);
        list.notify_one();
        assert!(t2.is_notified());
    }

    #[test]
    fn test_notify_empty_is_noop() {
        let list = NotifyList::new();
        assert_eq!(list.notify_one(), WakeResult::NoWaiters);
        assert_eq!(list.notify_all(), WakeResult::NoWaiters);
        assert_eq!(
            list.snapshot(),
            NotifySnapshot {
                wait_count: 0,
                notify_count: 0,
                pending: 0,
            }
        );
    }

    #[test]
    fn test_notify_all_then_noop() {
        let list = NotifyList::new();
        let tickets: Vec<_> = (0..3).map(|_| list.add()).collect();

        assert_eq!(list.notify_all(), WakeResult::Woken(3));
        assert!(tickets.iter().all(Ticket::is_notified));
        assert!(list.is_empty());

        // Counters stay settled
        assert_eq!(list.notify_one(), WakeResult::NoWaiters);
        let snap = list.snapshot();
        assert_eq!(snap.wait_count, 3);
        assert_eq!(snap.notify_count, 3);
    }

    #[test]
    fn test_notify_all_ignores_later_registrations() {
        let list = NotifyList::new();
        let early = list.add();
        list.notify_all();
        let late = list.add();

        assert!(early.is_notified());
        assert!(!late.is_notified());
        assert_eq!(late.id(), 1);
        assert_eq!(list.pending(), 1);

        list.notify_one();
        assert!(late.is_notified());
    }

    #[test]
    fn test_config_is_kept() {
        let list = NotifyList::with_config(SyncConfig::long_wait());
        assert_eq!(list.config().select_strategy(), StrategyType::Park);
        assert_eq!(list.config().max_spins, 0);

        let ticket = list.add();
        list.notify_one();
        list.wait(ticket);
    }

    #[test]
    fn test_wait_after_notify_does_not_block() {
        let list = NotifyList::new();
        let ticket = list.add();
        list.notify_one();
        list.wait(ticket);
    }

    #[test]
    fn test_wait_blocks_until_notified() {
        let list = Arc::new(NotifyList::new());
        let ticket = list.add();

        let list_clone = list.clone();
        let handle = thread::spawn(move || list_clone.wait(ticket));

        thread::sleep(Duration::from_millis(50));
        assert!(!handle.is_finished());

        assert_eq!(list.notify_one(), WakeResult::Woken(1));
        handle.join().unwrap();
    }

    #[test]
    fn test_snapshot_serializes() {
        let list = NotifyList::new();
        let _t = list.add();
        let json = serde_json::to_value(list.snapshot()).unwrap();
        assert_eq!(json["wait_count"], 1);
        assert_eq!(json["pending"], 1);
        list.notify_all();
    }
}
