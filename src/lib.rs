/*!
 * AI-OS Condition Variable
 * Ticketed, FIFO-fair condition variable over a caller-owned lock
 */

pub mod core;
pub mod monitoring;

// Re-exports
pub use crate::core::errors::{SyncError, SyncResult};
pub use crate::core::sync::{
    CondVar, CopyGuard, Lockable, NotifyList, NotifySnapshot, ReadLocker, StrategyType,
    SyncConfig, Ticket, WakeHandle, WakeResult,
};
pub use monitoring::init_tracing;
