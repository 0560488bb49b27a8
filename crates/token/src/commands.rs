//! Commands common to every fungible ledger.
//!
//! `caller` is the authenticated identity supplied by the execution context;
//! `occurred_at` is the operation time used for events and timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use spacedao_core::{Address, Amount};

/// Command: Genesis (one-time ledger creation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genesis {
    pub deployer: Address,
    pub occurred_at: DateTime<Utc>,
}

/// Command: TransferTokens (`caller` → `to`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTokens {
    pub caller: Address,
    pub to: Address,
    pub amount: Amount,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Approve (`caller` lets `spender` move up to `amount`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approve {
    pub caller: Address,
    pub spender: Address,
    pub amount: Amount,
    pub occurred_at: DateTime<Utc>,
}

/// Command: TransferTokensFrom (`caller` spends `owner`'s allowance).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTokensFrom {
    pub caller: Address,
    pub owner: Address,
    pub to: Address,
    pub amount: Amount,
    pub occurred_at: DateTime<Utc>,
}
