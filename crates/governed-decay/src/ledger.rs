use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use spacedao_access::{
    AccessControlRegistry, BURNER_ROLE, DEFAULT_ADMIN_ROLE, MINTER_ROLE, Role, RoleEvent,
};
use spacedao_core::{
    Address, Aggregate, AggregateRoot, Amount, LedgerError, LedgerId, LedgerResult, unix_seconds,
};
use spacedao_events::Event;
use spacedao_token::{
    Approve, BalanceSheet, FungibleLedger, Genesis, TokenEvent, TokenMetadata, TransferTokens,
    TransferTokensFrom,
};

use crate::decay::{DecayPolicy, NoDecay};

pub static METADATA: TokenMetadata = TokenMetadata::from_static("SpaceTime", "ST", 18);

/// Stream label used when this ledger's events are persisted.
pub const AGGREGATE_TYPE: &str = "ledger.governed_decay";

/// Aggregate root: GovernedDecayLedger.
///
/// Starts empty; value only enters through role-gated mint and leaves through
/// role-gated burn. Peer-to-peer transfer is permanently disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernedDecayLedger<P = NoDecay> {
    id: LedgerId,
    sheet: BalanceSheet,
    roles: AccessControlRegistry,
    policy: P,
    version: u64,
    created: bool,
}

impl GovernedDecayLedger {
    /// Empty aggregate (decay disabled) for genesis or rehydration.
    pub fn empty(id: LedgerId) -> Self {
        Self::with_policy(id, NoDecay::default())
    }
}

impl<P: DecayPolicy> GovernedDecayLedger<P> {
    pub fn with_policy(id: LedgerId, policy: P) -> Self {
        Self {
            id,
            sheet: BalanceSheet::new(),
            roles: AccessControlRegistry::new(),
            policy,
            version: 0,
            created: false,
        }
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn roles(&self) -> &AccessControlRegistry {
        &self.roles
    }

    pub fn has_role(&self, role: &Role, account: Address) -> bool {
        self.roles.has_role(role, account)
    }

    pub fn role_admin(&self, role: &Role) -> Role {
        self.roles.role_admin(role)
    }

    /// Unix seconds of the last mint to `account` (0 if never minted to).
    pub fn last_update_timestamp(&self, account: Address) -> u64 {
        self.sheet.last_update_timestamp(account)
    }

    pub fn decay_policy(&self) -> &P {
        &self.policy
    }

    pub fn decay_rate(&self) -> u64 {
        self.policy.rate()
    }

    /// Decay-adjusted view of `account`'s balance at time `at`.
    ///
    /// Never exceeds the stored balance, whatever the policy returns.
    pub fn effective_balance(&self, account: Address, at: DateTime<Utc>) -> Amount {
        let record = self.sheet.record(account);
        self.policy
            .effective_balance(record.amount, record.last_update_timestamp, unix_seconds(at))
            .min(record.amount)
    }
}

impl<P: DecayPolicy> FungibleLedger for GovernedDecayLedger<P> {
    fn metadata(&self) -> &TokenMetadata {
        &METADATA
    }

    fn balance_sheet(&self) -> &BalanceSheet {
        &self.sheet
    }
}

impl<P> AggregateRoot for GovernedDecayLedger<P> {
    type Id = LedgerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: Mint (requires `MINTER_ROLE`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mint {
    pub caller: Address,
    pub to: Address,
    pub amount: Amount,
    pub occurred_at: DateTime<Utc>,
}

/// Command: BurnFrom (requires `BURNER_ROLE`; custodial, `from` need not be the caller).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnFrom {
    pub caller: Address,
    pub from: Address,
    pub amount: Amount,
    pub occurred_at: DateTime<Utc>,
}

/// Command: GrantRole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRole {
    pub caller: Address,
    pub role: Role,
    pub account: Address,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RevokeRole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeRole {
    pub caller: Address,
    pub role: Role,
    pub account: Address,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RenounceRole (`caller` must equal `account`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenounceRole {
    pub caller: Address,
    pub role: Role,
    pub account: Address,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernedDecayCommand {
    Genesis(Genesis),
    Mint(Mint),
    Burn(BurnFrom),
    Transfer(TransferTokens),
    TransferFrom(TransferTokensFrom),
    Approve(Approve),
    GrantRole(GrantRole),
    RevokeRole(RevokeRole),
    RenounceRole(RenounceRole),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernedDecayEvent {
    Token(TokenEvent),
    Role(RoleEvent),
}

impl Event for GovernedDecayEvent {
    fn event_type(&self) -> &'static str {
        match self {
            GovernedDecayEvent::Token(e) => e.event_type(),
            GovernedDecayEvent::Role(e) => e.event_type(),
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            GovernedDecayEvent::Token(e) => e.occurred_at(),
            GovernedDecayEvent::Role(e) => e.occurred_at(),
        }
    }
}

impl<P: DecayPolicy> Aggregate for GovernedDecayLedger<P> {
    type Command = GovernedDecayCommand;
    type Event = GovernedDecayEvent;
    type Error = LedgerError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            GovernedDecayEvent::Token(e) => self.sheet.apply(e),
            GovernedDecayEvent::Role(e) => self.roles.apply(e),
        }

        self.created = true;
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            // Soulbound: rejected before anything else is looked at.
            GovernedDecayCommand::Transfer(_) | GovernedDecayCommand::TransferFrom(_) => {
                Err(LedgerError::non_transferable(METADATA.symbol()))
            }
            GovernedDecayCommand::Genesis(cmd) => self.handle_genesis(cmd),
            _ if !self.created => Err(LedgerError::NotInitialized),
            GovernedDecayCommand::Mint(cmd) => {
                self.roles.check_role(&MINTER_ROLE, cmd.caller)?;
                // A zero stamp would read back as "never minted".
                if unix_seconds(cmd.occurred_at) == 0 {
                    return Err(LedgerError::InvalidOperationTime);
                }
                let ev = self.sheet.decide_mint(cmd.to, cmd.amount, cmd.occurred_at)?;
                Ok(vec![GovernedDecayEvent::Token(ev)])
            }
            GovernedDecayCommand::Burn(cmd) => {
                self.roles.check_role(&BURNER_ROLE, cmd.caller)?;
                let ev = self.sheet.decide_burn(cmd.from, cmd.amount, cmd.occurred_at)?;
                Ok(vec![GovernedDecayEvent::Token(ev)])
            }
            GovernedDecayCommand::Approve(cmd) => {
                let ev = self
                    .sheet
                    .decide_approve(cmd.caller, cmd.spender, cmd.amount, cmd.occurred_at)?;
                Ok(vec![GovernedDecayEvent::Token(ev)])
            }
            GovernedDecayCommand::GrantRole(cmd) => {
                let ev = self
                    .roles
                    .decide_grant(cmd.caller, &cmd.role, cmd.account, cmd.occurred_at)?;
                Ok(ev.into_iter().map(GovernedDecayEvent::Role).collect())
            }
            GovernedDecayCommand::RevokeRole(cmd) => {
                let ev = self
                    .roles
                    .decide_revoke(cmd.caller, &cmd.role, cmd.account, cmd.occurred_at)?;
                Ok(ev.into_iter().map(GovernedDecayEvent::Role).collect())
            }
            GovernedDecayCommand::RenounceRole(cmd) => {
                let ev = self
                    .roles
                    .decide_renounce(cmd.caller, &cmd.role, cmd.account, cmd.occurred_at)?;
                Ok(ev.into_iter().map(GovernedDecayEvent::Role).collect())
            }
        }
    }
}

impl<P: DecayPolicy> GovernedDecayLedger<P> {
    fn handle_genesis(&self, cmd: &Genesis) -> LedgerResult<Vec<GovernedDecayEvent>> {
        if self.created {
            return Err(LedgerError::AlreadyInitialized);
        }
        if cmd.deployer.is_zero() {
            return Err(LedgerError::ZeroAddressRecipient);
        }

        let deployer = cmd.deployer;
        let at = cmd.occurred_at;
        let mut events = Vec::with_capacity(5);
        for role in [&MINTER_ROLE, &BURNER_ROLE] {
            events.push(self.roles.decide_set_role_admin(role, &DEFAULT_ADMIN_ROLE, at));
        }
        for role in [&DEFAULT_ADMIN_ROLE, &MINTER_ROLE, &BURNER_ROLE] {
            events.extend(self.roles.bootstrap_grant(deployer, role, deployer, at));
        }

        Ok(events.into_iter().map(GovernedDecayEvent::Role).collect())
    }
}
