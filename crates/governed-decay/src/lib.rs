//! SpaceTime: soulbound, role-governed ledger with per-balance timestamps
//! for decay.
//!
//! Pure domain logic only: no IO, no persistence concerns.

pub mod decay;
pub mod ledger;

pub use decay::{DECAY_RATE, DecayPolicy, NoDecay};
pub use ledger::{
    AGGREGATE_TYPE, BurnFrom, GovernedDecayCommand, GovernedDecayEvent, GovernedDecayLedger,
    GrantRole, METADATA, Mint, RenounceRole, RevokeRole,
};
