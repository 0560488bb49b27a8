//! Ledger error taxonomy.

use thiserror::Error;

use crate::{Address, Amount};

/// Result type used across the ledger domain layer.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger-level error.
///
/// Every variant is terminal for the call that raised it: the operation is
/// rejected before any state is touched. Infrastructure failures (storage,
/// publication) are modelled separately in `spacedao-infra`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The caller lacks the role (or ownership) required by the operation.
    #[error("permission denied: account {account} is missing role '{role}'")]
    PermissionDenied { account: Address, role: String },

    /// A debit would take a balance below zero.
    #[error("insufficient balance: account {account} holds {balance}, needs {needed}")]
    InsufficientBalance {
        account: Address,
        balance: Amount,
        needed: Amount,
    },

    /// A delegated spend exceeds the approved allowance.
    #[error("insufficient allowance: {spender} may spend {allowance} for {owner}, needs {needed}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        allowance: Amount,
        needed: Amount,
    },

    /// Value cannot be sent to the zero address.
    #[error("recipient is the zero address")]
    ZeroAddressRecipient,

    /// The zero address cannot be debited or grant allowances.
    #[error("sender is the zero address")]
    ZeroAddressSender,

    /// An allowance cannot be granted to the zero address.
    #[error("spender is the zero address")]
    ZeroAddressSpender,

    /// Ownership cannot be handed to the zero address.
    #[error("new owner is the zero address")]
    ZeroAddressOwner,

    /// The ledger does not support peer-to-peer transfer.
    #[error("{symbol} is non-transferable")]
    NonTransferable { symbol: String },

    /// Minting would overflow the supply counter.
    #[error("total supply overflow")]
    SupplyOverflow,

    /// A timestamped operation was dated at or before the unix epoch.
    #[error("operation time must be after the unix epoch")]
    InvalidOperationTime,

    /// Genesis was requested for a ledger that already exists.
    #[error("ledger already initialized")]
    AlreadyInitialized,

    /// An operation was requested before genesis.
    #[error("ledger not initialized")]
    NotInitialized,
}

impl LedgerError {
    pub fn permission_denied(account: Address, role: impl Into<String>) -> Self {
        Self::PermissionDenied {
            account,
            role: role.into(),
        }
    }

    pub fn non_transferable(symbol: impl Into<String>) -> Self {
        Self::NonTransferable {
            symbol: symbol.into(),
        }
    }
}
