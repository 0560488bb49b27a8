use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use spacedao_core::{Address, Amount};
use spacedao_events::Event;

/// Event: Transfer.
///
/// `from == ZERO` records a mint, `to == ZERO` records a burn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    #[serde(with = "spacedao_core::amount::decimal")]
    pub amount: Amount,
    pub occurred_at: DateTime<Utc>,
}

impl Transfer {
    pub fn is_mint(&self) -> bool {
        self.from.is_zero()
    }

    pub fn is_burn(&self) -> bool {
        self.to.is_zero()
    }
}

/// Event: Approval. `amount` is the new allowance, not a delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub owner: Address,
    pub spender: Address,
    #[serde(with = "spacedao_core::amount::decimal")]
    pub amount: Amount,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenEvent {
    Transfer(Transfer),
    Approval(Approval),
}

impl Event for TokenEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TokenEvent::Transfer(_) => "token.transfer",
            TokenEvent::Approval(_) => "token.approval",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            TokenEvent::Transfer(e) => e.occurred_at,
            TokenEvent::Approval(e) => e.occurred_at,
        }
    }
}
