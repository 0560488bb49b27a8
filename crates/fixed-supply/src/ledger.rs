use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use spacedao_core::{
    Address, Aggregate, AggregateRoot, Amount, LedgerError, LedgerId, LedgerResult,
};
use spacedao_events::Event;
use spacedao_token::{
    Approve, BalanceSheet, FungibleLedger, Genesis, TokenEvent, TokenMetadata, TransferTokens,
    TransferTokensFrom,
};

pub static METADATA: TokenMetadata = TokenMetadata::from_static("SpaceMoney", "SM", 18);

/// Stream label used when this ledger's events are persisted.
pub const AGGREGATE_TYPE: &str = "ledger.fixed_supply";

/// One billion whole tokens at 18 decimals, all minted at genesis.
pub const MAX_SUPPLY: Amount = 1_000_000_000 * 10u128.pow(18);

/// Label reported in `PermissionDenied` for owner-gated calls.
pub const OWNER_ROLE: &str = "owner";

/// Aggregate root: FixedSupplyLedger.
///
/// The whole supply is minted to the deployer at genesis. Afterwards value
/// only moves (transfer) or disappears (burn); no mint path exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedSupplyLedger {
    id: LedgerId,
    sheet: BalanceSheet,
    owner: Address,
    version: u64,
    created: bool,
}

impl FixedSupplyLedger {
    /// Empty aggregate for genesis or rehydration.
    pub fn empty(id: LedgerId) -> Self {
        Self {
            id,
            sheet: BalanceSheet::new(),
            owner: Address::ZERO,
            version: 0,
            created: false,
        }
    }

    /// Current owner; `Address::ZERO` once ownership has been renounced.
    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn max_supply(&self) -> Amount {
        MAX_SUPPLY
    }

    pub fn is_created(&self) -> bool {
        self.created
    }
}

impl FungibleLedger for FixedSupplyLedger {
    fn metadata(&self) -> &TokenMetadata {
        &METADATA
    }

    fn balance_sheet(&self) -> &BalanceSheet {
        &self.sheet
    }
}

impl AggregateRoot for FixedSupplyLedger {
    type Id = LedgerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: BurnTokens (caller destroys its own balance).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnTokens {
    pub caller: Address,
    pub amount: Amount,
    pub occurred_at: DateTime<Utc>,
}

/// Command: TransferOwnership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOwnership {
    pub caller: Address,
    pub new_owner: Address,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RenounceOwnership (leaves the ledger without an owner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenounceOwnership {
    pub caller: Address,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixedSupplyCommand {
    Genesis(Genesis),
    Transfer(TransferTokens),
    Approve(Approve),
    TransferFrom(TransferTokensFrom),
    Burn(BurnTokens),
    TransferOwnership(TransferOwnership),
    RenounceOwnership(RenounceOwnership),
}

/// Event: OwnershipTransferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransferred {
    pub previous_owner: Address,
    pub new_owner: Address,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixedSupplyEvent {
    Token(TokenEvent),
    OwnershipTransferred(OwnershipTransferred),
}

impl Event for FixedSupplyEvent {
    fn event_type(&self) -> &'static str {
        match self {
            FixedSupplyEvent::Token(e) => e.event_type(),
            FixedSupplyEvent::OwnershipTransferred(_) => "fixed_supply.ownership_transferred",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            FixedSupplyEvent::Token(e) => e.occurred_at(),
            FixedSupplyEvent::OwnershipTransferred(e) => e.occurred_at,
        }
    }
}

impl Aggregate for FixedSupplyLedger {
    type Command = FixedSupplyCommand;
    type Event = FixedSupplyEvent;
    type Error = LedgerError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            FixedSupplyEvent::Token(e) => {
                self.sheet.apply(e);
                self.created = true;
            }
            FixedSupplyEvent::OwnershipTransferred(e) => {
                self.owner = e.new_owner;
                self.created = true;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        if let FixedSupplyCommand::Genesis(cmd) = command {
            return self.handle_genesis(cmd);
        }
        if !self.created {
            return Err(LedgerError::NotInitialized);
        }

        match command {
            FixedSupplyCommand::Genesis(_) => Err(LedgerError::AlreadyInitialized),
            FixedSupplyCommand::Transfer(cmd) => {
                let ev = self
                    .sheet
                    .decide_transfer(cmd.caller, cmd.to, cmd.amount, cmd.occurred_at)?;
                Ok(vec![FixedSupplyEvent::Token(ev)])
            }
            FixedSupplyCommand::Approve(cmd) => {
                let ev = self
                    .sheet
                    .decide_approve(cmd.caller, cmd.spender, cmd.amount, cmd.occurred_at)?;
                Ok(vec![FixedSupplyEvent::Token(ev)])
            }
            FixedSupplyCommand::TransferFrom(cmd) => {
                let events = self.sheet.decide_transfer_from(
                    cmd.caller,
                    cmd.owner,
                    cmd.to,
                    cmd.amount,
                    cmd.occurred_at,
                )?;
                Ok(events.into_iter().map(FixedSupplyEvent::Token).collect())
            }
            FixedSupplyCommand::Burn(cmd) => {
                let ev = self
                    .sheet
                    .decide_burn(cmd.caller, cmd.amount, cmd.occurred_at)?;
                Ok(vec![FixedSupplyEvent::Token(ev)])
            }
            FixedSupplyCommand::TransferOwnership(cmd) => self.handle_transfer_ownership(cmd),
            FixedSupplyCommand::RenounceOwnership(cmd) => {
                self.ensure_owner(cmd.caller)?;
                Ok(vec![self.ownership_change(Address::ZERO, cmd.occurred_at)])
            }
        }
    }
}

impl FixedSupplyLedger {
    fn ensure_owner(&self, caller: Address) -> LedgerResult<()> {
        if self.owner.is_zero() || self.owner != caller {
            return Err(LedgerError::permission_denied(caller, OWNER_ROLE));
        }
        Ok(())
    }

    fn ownership_change(&self, new_owner: Address, occurred_at: DateTime<Utc>) -> FixedSupplyEvent {
        FixedSupplyEvent::OwnershipTransferred(OwnershipTransferred {
            previous_owner: self.owner,
            new_owner,
            occurred_at,
        })
    }

    fn handle_genesis(&self, cmd: &Genesis) -> LedgerResult<Vec<FixedSupplyEvent>> {
        if self.created {
            return Err(LedgerError::AlreadyInitialized);
        }
        let mint = self
            .sheet
            .decide_mint(cmd.deployer, MAX_SUPPLY, cmd.occurred_at)?;
        Ok(vec![
            FixedSupplyEvent::Token(mint),
            self.ownership_change(cmd.deployer, cmd.occurred_at),
        ])
    }

    fn handle_transfer_ownership(
        &self,
        cmd: &TransferOwnership,
    ) -> LedgerResult<Vec<FixedSupplyEvent>> {
        self.ensure_owner(cmd.caller)?;
        if cmd.new_owner.is_zero() {
            return Err(LedgerError::ZeroAddressOwner);
        }
        Ok(vec![self.ownership_change(cmd.new_owner, cmd.occurred_at)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use spacedao_core::units;
    use spacedao_events::execute;

    fn tokens(whole: u128) -> Amount {
        units(whole, 18).unwrap()
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn deployed(deployer: Address) -> FixedSupplyLedger {
        let mut ledger = FixedSupplyLedger::empty(LedgerId::new());
        execute(
            &mut ledger,
            &FixedSupplyCommand::Genesis(Genesis {
                deployer,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        ledger
    }

    fn transfer(caller: Address, to: Address, amount: Amount) -> FixedSupplyCommand {
        FixedSupplyCommand::Transfer(TransferTokens {
            caller,
            to,
            amount,
            occurred_at: test_time(),
        })
    }

    fn approve(caller: Address, spender: Address, amount: Amount) -> FixedSupplyCommand {
        FixedSupplyCommand::Approve(Approve {
            caller,
            spender,
            amount,
            occurred_at: test_time(),
        })
    }

    fn transfer_from(
        caller: Address,
        owner: Address,
        to: Address,
        amount: Amount,
    ) -> FixedSupplyCommand {
        FixedSupplyCommand::TransferFrom(TransferTokensFrom {
            caller,
            owner,
            to,
            amount,
            occurred_at: test_time(),
        })
    }

    fn burn(caller: Address, amount: Amount) -> FixedSupplyCommand {
        FixedSupplyCommand::Burn(BurnTokens {
            caller,
            amount,
            occurred_at: test_time(),
        })
    }

    #[test]
    fn genesis_mints_max_supply_to_deployer() {
        let deployer = Address::new();
        let ledger = deployed(deployer);

        assert_eq!(MAX_SUPPLY, tokens(1_000_000_000));
        assert_eq!(ledger.balance_of(deployer), MAX_SUPPLY);
        assert_eq!(ledger.total_supply(), MAX_SUPPLY);
        assert_eq!(ledger.owner(), deployer);
        assert_eq!(ledger.name(), "SpaceMoney");
        assert_eq!(ledger.symbol(), "SM");
        assert_eq!(ledger.decimals(), 18);
        assert_eq!(ledger.version(), 2);
    }

    #[test]
    fn genesis_emits_mint_and_ownership_events() {
        let deployer = Address::new();
        let ledger = FixedSupplyLedger::empty(LedgerId::new());
        let events = ledger
            .handle(&FixedSupplyCommand::Genesis(Genesis {
                deployer,
                occurred_at: test_time(),
            }))
            .unwrap();

        match &events[..] {
            [
                FixedSupplyEvent::Token(TokenEvent::Transfer(t)),
                FixedSupplyEvent::OwnershipTransferred(o),
            ] => {
                assert_eq!(t.from, Address::ZERO);
                assert_eq!(t.to, deployer);
                assert_eq!(t.amount, MAX_SUPPLY);
                assert_eq!(o.previous_owner, Address::ZERO);
                assert_eq!(o.new_owner, deployer);
            }
            other => panic!("unexpected genesis events: {other:?}"),
        }
    }

    #[test]
    fn second_genesis_is_rejected() {
        let deployer = Address::new();
        let ledger = deployed(deployer);
        let err = ledger
            .handle(&FixedSupplyCommand::Genesis(Genesis {
                deployer: Address::new(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(err, LedgerError::AlreadyInitialized);
    }

    #[test]
    fn commands_before_genesis_are_rejected() {
        let ledger = FixedSupplyLedger::empty(LedgerId::new());
        let err = ledger
            .handle(&transfer(Address::new(), Address::new(), 0))
            .unwrap_err();
        assert_eq!(err, LedgerError::NotInitialized);
    }

    #[test]
    fn transfer_moves_value_and_emits_event() {
        let deployer = Address::new();
        let alice = Address::new();
        let bob = Address::new();
        let mut ledger = deployed(deployer);
        let amount = tokens(1000);

        let events = execute(&mut ledger, &transfer(deployer, alice, amount)).unwrap();
        assert_eq!(ledger.balance_of(alice), amount);
        assert_eq!(ledger.balance_of(deployer), MAX_SUPPLY - amount);
        match &events[..] {
            [FixedSupplyEvent::Token(TokenEvent::Transfer(t))] => {
                assert_eq!((t.from, t.to, t.amount), (deployer, alice, amount));
            }
            other => panic!("unexpected events: {other:?}"),
        }

        execute(&mut ledger, &transfer(alice, bob, amount)).unwrap();
        assert_eq!(ledger.balance_of(bob), amount);
        assert_eq!(ledger.balance_of(alice), 0);
    }

    #[test]
    fn transfer_without_funds_fails() {
        let deployer = Address::new();
        let alice = Address::new();
        let mut ledger = deployed(deployer);
        let before = ledger.clone();

        let err = execute(&mut ledger, &transfer(alice, deployer, tokens(1))).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { balance: 0, .. }));
        assert_eq!(ledger, before);
    }

    #[test]
    fn transfer_to_zero_address_is_rejected_without_side_effects() {
        let deployer = Address::new();
        let mut ledger = deployed(deployer);
        let before = ledger.clone();

        let err =
            execute(&mut ledger, &transfer(deployer, Address::ZERO, tokens(1))).unwrap_err();
        assert_eq!(err, LedgerError::ZeroAddressRecipient);
        assert_eq!(ledger, before);
        assert_eq!(ledger.total_supply(), MAX_SUPPLY);
    }

    #[test]
    fn zero_amount_and_self_transfers_succeed() {
        let deployer = Address::new();
        let alice = Address::new();
        let mut ledger = deployed(deployer);

        execute(&mut ledger, &transfer(deployer, alice, 0)).unwrap();
        assert_eq!(ledger.balance_of(alice), 0);

        let events = execute(&mut ledger, &transfer(deployer, deployer, tokens(1000))).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(ledger.balance_of(deployer), MAX_SUPPLY);
    }

    #[test]
    fn approve_overwrites_and_transfer_from_spends() {
        let deployer = Address::new();
        let alice = Address::new();
        let bob = Address::new();
        let mut ledger = deployed(deployer);

        execute(&mut ledger, &approve(deployer, alice, tokens(5))).unwrap();
        execute(&mut ledger, &approve(deployer, alice, tokens(1000))).unwrap();
        assert_eq!(ledger.allowance(deployer, alice), tokens(1000));

        let events =
            execute(&mut ledger, &transfer_from(alice, deployer, bob, tokens(400))).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(ledger.balance_of(bob), tokens(400));
        assert_eq!(ledger.allowance(deployer, alice), tokens(600));
    }

    #[test]
    fn transfer_from_without_approval_fails() {
        let deployer = Address::new();
        let alice = Address::new();
        let bob = Address::new();
        let mut ledger = deployed(deployer);
        let before = ledger.clone();

        let err =
            execute(&mut ledger, &transfer_from(alice, deployer, bob, tokens(1000))).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientAllowance { .. }));
        assert_eq!(ledger, before);
    }

    #[test]
    fn transfer_from_to_zero_address_is_rejected() {
        let deployer = Address::new();
        let alice = Address::new();
        let mut ledger = deployed(deployer);
        execute(&mut ledger, &approve(deployer, alice, tokens(10))).unwrap();

        let err = execute(
            &mut ledger,
            &transfer_from(alice, deployer, Address::ZERO, tokens(1)),
        )
        .unwrap_err();
        assert_eq!(err, LedgerError::ZeroAddressRecipient);
        assert_eq!(ledger.allowance(deployer, alice), tokens(10));
    }

    #[test]
    fn burn_reduces_balance_and_supply() {
        let deployer = Address::new();
        let alice = Address::new();
        let mut ledger = deployed(deployer);
        execute(&mut ledger, &transfer(deployer, alice, tokens(1000))).unwrap();

        let events = execute(&mut ledger, &burn(alice, tokens(500))).unwrap();
        assert_eq!(ledger.balance_of(alice), tokens(500));
        assert_eq!(ledger.total_supply(), MAX_SUPPLY - tokens(500));
        match &events[..] {
            [FixedSupplyEvent::Token(TokenEvent::Transfer(t))] => {
                assert_eq!((t.from, t.to, t.amount), (alice, Address::ZERO, tokens(500)));
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn burn_more_than_balance_fails() {
        let deployer = Address::new();
        let alice = Address::new();
        let mut ledger = deployed(deployer);
        let err = execute(&mut ledger, &burn(alice, tokens(1))).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
    }

    #[test]
    fn only_owner_transfers_ownership() {
        let deployer = Address::new();
        let alice = Address::new();
        let bob = Address::new();
        let mut ledger = deployed(deployer);

        let err = execute(
            &mut ledger,
            &FixedSupplyCommand::TransferOwnership(TransferOwnership {
                caller: alice,
                new_owner: bob,
                occurred_at: test_time(),
            }),
        )
        .unwrap_err();
        assert_eq!(err, LedgerError::permission_denied(alice, OWNER_ROLE));

        execute(
            &mut ledger,
            &FixedSupplyCommand::TransferOwnership(TransferOwnership {
                caller: deployer,
                new_owner: alice,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(ledger.owner(), alice);
    }

    #[test]
    fn ownership_cannot_go_to_zero_address() {
        let deployer = Address::new();
        let mut ledger = deployed(deployer);
        let err = execute(
            &mut ledger,
            &FixedSupplyCommand::TransferOwnership(TransferOwnership {
                caller: deployer,
                new_owner: Address::ZERO,
                occurred_at: test_time(),
            }),
        )
        .unwrap_err();
        assert_eq!(err, LedgerError::ZeroAddressOwner);
    }

    #[test]
    fn renounced_ownership_locks_owner_calls() {
        let deployer = Address::new();
        let mut ledger = deployed(deployer);
        execute(
            &mut ledger,
            &FixedSupplyCommand::RenounceOwnership(RenounceOwnership {
                caller: deployer,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(ledger.owner(), Address::ZERO);

        let err = execute(
            &mut ledger,
            &FixedSupplyCommand::RenounceOwnership(RenounceOwnership {
                caller: Address::ZERO,
                occurred_at: test_time(),
            }),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::PermissionDenied { .. }));
    }

    #[test]
    fn events_roundtrip_through_json_and_replay() {
        let deployer = Address::new();
        let alice = Address::new();
        let mut ledger = deployed(deployer);
        let mut history = Vec::new();
        for cmd in [
            transfer(deployer, alice, tokens(10)),
            approve(alice, deployer, tokens(3)),
            burn(alice, tokens(2)),
        ] {
            history.extend(execute(&mut ledger, &cmd).unwrap());
        }

        let json = serde_json::to_string(&history).unwrap();
        let decoded: Vec<FixedSupplyEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, history);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Transfer(usize, usize, u128),
        Approve(usize, usize, u128),
        TransferFrom(usize, usize, usize, u128),
        Burn(usize, u128),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        let amount = prop_oneof![0u128..1_000, Just(MAX_SUPPLY), 0u128..=MAX_SUPPLY].boxed();
        prop_oneof![
            (0usize..4, 0usize..5, amount.clone()).prop_map(|(a, b, n)| Op::Transfer(a, b, n)),
            (0usize..4, 0usize..4, amount.clone()).prop_map(|(a, b, n)| Op::Approve(a, b, n)),
            (0usize..4, 0usize..4, 0usize..5, amount.clone())
                .prop_map(|(a, b, c, n)| Op::TransferFrom(a, b, c, n)),
            (0usize..4, amount).prop_map(|(a, n)| Op::Burn(a, n)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: for arbitrary call sequences, balances always sum to the
        /// total supply, the supply never exceeds MAX_SUPPLY, and a rejected
        /// call leaves the ledger untouched.
        #[test]
        fn supply_is_conserved_and_capped(ops in prop::collection::vec(op_strategy(), 1..40)) {
            // Index 4 is the zero address, used only as a destination.
            let mut accounts: Vec<Address> = (0..4).map(|_| Address::new()).collect();
            accounts.push(Address::ZERO);
            let mut ledger = deployed(accounts[0]);

            for op in ops {
                let cmd = match op {
                    Op::Transfer(a, b, n) => transfer(accounts[a], accounts[b], n),
                    Op::Approve(a, b, n) => approve(accounts[a], accounts[b], n),
                    Op::TransferFrom(a, b, c, n) => {
                        transfer_from(accounts[a], accounts[b], accounts[c], n)
                    }
                    Op::Burn(a, n) => burn(accounts[a], n),
                };
                let before = ledger.clone();
                let supply_before = ledger.total_supply();

                if execute(&mut ledger, &cmd).is_err() {
                    prop_assert_eq!(&ledger, &before);
                }

                prop_assert!(ledger.balance_sheet().is_conserved());
                prop_assert!(ledger.total_supply() <= MAX_SUPPLY);
                prop_assert!(ledger.total_supply() <= supply_before);
                prop_assert_eq!(ledger.balance_of(Address::ZERO), 0);
            }
        }
    }
}
