//! SpaceMoney: transferable ledger with a supply fixed at genesis.
//!
//! Pure domain logic only: no IO, no persistence concerns.

pub mod ledger;

pub use ledger::{
    AGGREGATE_TYPE, BurnTokens, FixedSupplyCommand, FixedSupplyEvent, FixedSupplyLedger,
    MAX_SUPPLY, METADATA, OWNER_ROLE, OwnershipTransferred, RenounceOwnership, TransferOwnership,
};
