use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use spacedao_core::{Address, Amount, LedgerError, LedgerResult, unix_seconds};

use crate::events::{Approval, TokenEvent, Transfer};

/// One account's holding in one ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub amount: Amount,
    /// Unix seconds of the last mint credited to this account (0 if never).
    pub last_update_timestamp: u64,
}

/// Balances, allowances and total supply of a single ledger.
///
/// Follows the same decide/apply split as the aggregates that own it:
/// `decide_*` validates and returns events, `apply` records them. All
/// sufficiency and zero-address checks happen in the decide step, so `apply`
/// cannot fail for an event this sheet decided.
///
/// Invariant: the sum of all balances equals `total_supply`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceSheet {
    total_supply: Amount,
    balances: BTreeMap<Address, BalanceRecord>,
    allowances: BTreeMap<(Address, Address), Amount>,
}

impl BalanceSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn balance_of(&self, account: Address) -> Amount {
        self.record(account).amount
    }

    pub fn last_update_timestamp(&self, account: Address) -> u64 {
        self.record(account).last_update_timestamp
    }

    pub fn record(&self, account: Address) -> BalanceRecord {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    /// Accounts with a record, in address order.
    pub fn holders(&self) -> impl Iterator<Item = (Address, BalanceRecord)> + '_ {
        self.balances.iter().map(|(a, r)| (*a, *r))
    }

    /// Sum of every balance (`None` if it overflows, which would itself be a
    /// broken invariant).
    pub fn holdings_total(&self) -> Option<Amount> {
        self.balances
            .values()
            .try_fold(0u128, |acc, r| acc.checked_add(r.amount))
    }

    pub fn is_conserved(&self) -> bool {
        self.holdings_total() == Some(self.total_supply)
    }

    fn ensure_balance(&self, account: Address, needed: Amount) -> LedgerResult<()> {
        let balance = self.balance_of(account);
        if balance < needed {
            return Err(LedgerError::InsufficientBalance {
                account,
                balance,
                needed,
            });
        }
        Ok(())
    }

    fn ensure_sender(account: Address) -> LedgerResult<()> {
        if account.is_zero() {
            return Err(LedgerError::ZeroAddressSender);
        }
        Ok(())
    }

    fn ensure_recipient(account: Address) -> LedgerResult<()> {
        if account.is_zero() {
            return Err(LedgerError::ZeroAddressRecipient);
        }
        Ok(())
    }

    pub fn decide_transfer(
        &self,
        from: Address,
        to: Address,
        amount: Amount,
        occurred_at: DateTime<Utc>,
    ) -> LedgerResult<TokenEvent> {
        Self::ensure_sender(from)?;
        Self::ensure_recipient(to)?;
        self.ensure_balance(from, amount)?;
        Ok(TokenEvent::Transfer(Transfer {
            from,
            to,
            amount,
            occurred_at,
        }))
    }

    /// Decide a delegated transfer by `spender` out of `owner`'s balance.
    ///
    /// Emits the reduced allowance as an `Approval` followed by the `Transfer`.
    pub fn decide_transfer_from(
        &self,
        spender: Address,
        owner: Address,
        to: Address,
        amount: Amount,
        occurred_at: DateTime<Utc>,
    ) -> LedgerResult<Vec<TokenEvent>> {
        Self::ensure_sender(owner)?;
        Self::ensure_recipient(to)?;

        let allowance = self.allowance(owner, spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner,
                spender,
                allowance,
                needed: amount,
            });
        }
        self.ensure_balance(owner, amount)?;

        Ok(vec![
            TokenEvent::Approval(Approval {
                owner,
                spender,
                amount: allowance - amount,
                occurred_at,
            }),
            TokenEvent::Transfer(Transfer {
                from: owner,
                to,
                amount,
                occurred_at,
            }),
        ])
    }

    pub fn decide_approve(
        &self,
        owner: Address,
        spender: Address,
        amount: Amount,
        occurred_at: DateTime<Utc>,
    ) -> LedgerResult<TokenEvent> {
        Self::ensure_sender(owner)?;
        if spender.is_zero() {
            return Err(LedgerError::ZeroAddressSpender);
        }
        Ok(TokenEvent::Approval(Approval {
            owner,
            spender,
            amount,
            occurred_at,
        }))
    }

    pub fn decide_mint(
        &self,
        to: Address,
        amount: Amount,
        occurred_at: DateTime<Utc>,
    ) -> LedgerResult<TokenEvent> {
        Self::ensure_recipient(to)?;
        self.total_supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow)?;
        Ok(TokenEvent::Transfer(Transfer {
            from: Address::ZERO,
            to,
            amount,
            occurred_at,
        }))
    }

    pub fn decide_burn(
        &self,
        from: Address,
        amount: Amount,
        occurred_at: DateTime<Utc>,
    ) -> LedgerResult<TokenEvent> {
        Self::ensure_sender(from)?;
        self.ensure_balance(from, amount)?;
        Ok(TokenEvent::Transfer(Transfer {
            from,
            to: Address::ZERO,
            amount,
            occurred_at,
        }))
    }

    pub fn apply(&mut self, event: &TokenEvent) {
        match event {
            TokenEvent::Transfer(e) => self.apply_transfer(e),
            TokenEvent::Approval(e) => {
                self.allowances.insert((e.owner, e.spender), e.amount);
            }
        }
    }

    fn apply_transfer(&mut self, e: &Transfer) {
        if e.is_mint() {
            self.total_supply += e.amount;
        } else {
            self.balances.entry(e.from).or_default().amount -= e.amount;
        }

        if e.is_burn() {
            self.total_supply -= e.amount;
        } else {
            let record = self.balances.entry(e.to).or_default();
            record.amount += e.amount;
            if e.is_mint() {
                record.last_update_timestamp = unix_seconds(e.occurred_at);
            }
        }
    }
}
