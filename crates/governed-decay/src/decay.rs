//! Decay extension point.
//!
//! No decay formula is settled yet. A policy maps a stored balance and the
//! time elapsed since its last mint to a read-time "effective" balance; the
//! stored balance itself is never rewritten by decay.

use spacedao_core::Amount;

/// Rate constant reported by the default policy.
pub const DECAY_RATE: u64 = 1;

/// Read-time decay of a stored balance.
///
/// Contract:
/// - never return more than `stored`;
/// - return `stored` when `now <= last_update`.
///
/// The ledger clamps the result to `stored` regardless.
pub trait DecayPolicy: Clone + core::fmt::Debug + Send + Sync {
    /// Rate constant this policy is parameterized with.
    fn rate(&self) -> u64;

    /// `last_update` and `now` are unix seconds.
    fn effective_balance(&self, stored: Amount, last_update: u64, now: u64) -> Amount;
}

/// Decay disabled: the effective balance is the stored balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoDecay {
    rate: u64,
}

impl NoDecay {
    pub fn new(rate: u64) -> Self {
        Self { rate }
    }
}

impl Default for NoDecay {
    fn default() -> Self {
        Self::new(DECAY_RATE)
    }
}

impl DecayPolicy for NoDecay {
    fn rate(&self) -> u64 {
        self.rate
    }

    fn effective_balance(&self, stored: Amount, _last_update: u64, _now: u64) -> Amount {
        stored
    }
}
