//! `spacedao-token`: the fungible-balance core shared by every ledger.
//!
//! Pure domain logic only: no IO, no persistence concerns.

pub mod balance_sheet;
pub mod commands;
pub mod events;
pub mod metadata;

pub use balance_sheet::{BalanceRecord, BalanceSheet};
pub use commands::{Approve, Genesis, TransferTokens, TransferTokensFrom};
pub use events::{Approval, TokenEvent, Transfer};
pub use metadata::TokenMetadata;

use spacedao_core::{Address, Amount};

/// Standard fungible-ledger read surface.
///
/// Implementors only provide their metadata and balance sheet; the queries
/// are derived.
pub trait FungibleLedger {
    fn metadata(&self) -> &TokenMetadata;

    fn balance_sheet(&self) -> &BalanceSheet;

    fn name(&self) -> &str {
        self.metadata().name()
    }

    fn symbol(&self) -> &str {
        self.metadata().symbol()
    }

    fn decimals(&self) -> u8 {
        self.metadata().decimals()
    }

    fn total_supply(&self) -> Amount {
        self.balance_sheet().total_supply()
    }

    fn balance_of(&self, account: Address) -> Amount {
        self.balance_sheet().balance_of(account)
    }

    fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.balance_sheet().allowance(owner, spender)
    }
}
