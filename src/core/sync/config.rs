/*!
 * Synchronization Configuration
 *
 * Runtime configuration for how a waiter suspends
 */

use std::time::Duration;

/// Strategy type selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyType {
    /// Park immediately (futex-style, zero CPU while waiting)
    Park,
    /// Adaptive spin before parking (low-latency, burns CPU for short waits)
    SpinPark,
    /// Auto-select based on platform and use case
    Auto,
}

/// Synchronization configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Preferred strategy
    pub strategy: StrategyType,
    /// Spin duration before parking (for SpinPark)
    pub spin_duration: Duration,
    /// Maximum spin iterations before parking
    pub max_spins: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyType::Auto,
            spin_duration: Duration::from_micros(10),
            max_spins: 100,
        }
    }
}

impl SyncConfig {
    /// Configuration optimized for low-latency (< 1ms wait expected)
    pub const fn low_latency() -> Self {
        Self {
            strategy: StrategyType::SpinPark,
            spin_duration: Duration::from_micros(50),
            max_spins: 500,
        }
    }

    /// Configuration optimized for long waits (> 1ms expected)
    ///
    /// Parks straight away with no spin budget.
    pub const fn long_wait() -> Self {
        Self {
            strategy: StrategyType::Park,
            spin_duration: Duration::ZERO,
            max_spins: 0,
        }
    }

    /// Resolve `Auto` to a concrete strategy
    ///
    /// Condition variable waits are usually long relative to a context
    /// switch, so `Auto` parks straight away.
    pub fn select_strategy(&self) -> StrategyType {
        match self.strategy {
            StrategyType::Auto => StrategyType::Park,
            other => other,
        }
    }

    /// Whether waiters should spin before parking
    #[inline]
    pub(crate) fn spins(&self) -> bool {
        self.select_strategy() == StrategyType::SpinPark && self.max_spins > 0
    }
}
