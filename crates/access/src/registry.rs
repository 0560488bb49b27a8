use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use spacedao_core::{Address, LedgerError, LedgerResult};

use crate::events::{RoleAdminChanged, RoleEvent, RoleGranted, RoleRevoked};
use crate::Role;

/// Role → members, role → administering role.
///
/// Every mutation comes in two halves: a `decide_*` method that checks
/// permissions and returns the event it would emit (never mutating), and
/// [`apply`](Self::apply) which records an already-decided event. Ledgers use
/// the halves separately so their own transitions stay all-or-nothing; the
/// `grant_role`/`revoke_role`/`renounce_role` shortcuts combine them for
/// standalone use.
///
/// A role with no explicit admin is administered by itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessControlRegistry {
    members: BTreeMap<Role, BTreeSet<Address>>,
    admins: BTreeMap<Role, Role>,
}

impl AccessControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_role(&self, role: &Role, account: Address) -> bool {
        self.members
            .get(role)
            .is_some_and(|members| members.contains(&account))
    }

    /// The role whose members may grant and revoke `role`.
    pub fn role_admin(&self, role: &Role) -> Role {
        self.admins.get(role).cloned().unwrap_or_else(|| role.clone())
    }

    /// Current members of `role`, in address order.
    pub fn members(&self, role: &Role) -> Vec<Address> {
        self.members
            .get(role)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn check_role(&self, role: &Role, account: Address) -> LedgerResult<()> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(LedgerError::permission_denied(account, role.as_str()))
        }
    }

    fn check_admin(&self, role: &Role, caller: Address) -> LedgerResult<()> {
        self.check_role(&self.role_admin(role), caller)
    }

    /// Decide a grant requested by `caller`.
    ///
    /// Granting to an existing member is accepted and yields no event.
    pub fn decide_grant(
        &self,
        caller: Address,
        role: &Role,
        account: Address,
        occurred_at: DateTime<Utc>,
    ) -> LedgerResult<Option<RoleEvent>> {
        self.check_admin(role, caller)?;
        Ok(self.bootstrap_grant(caller, role, account, occurred_at))
    }

    /// Decide a revocation requested by `caller`.
    ///
    /// Revoking a non-member is accepted and yields no event.
    pub fn decide_revoke(
        &self,
        caller: Address,
        role: &Role,
        account: Address,
        occurred_at: DateTime<Utc>,
    ) -> LedgerResult<Option<RoleEvent>> {
        self.check_admin(role, caller)?;
        Ok(self.revocation(caller, role, account, occurred_at))
    }

    /// Decide a renunciation. Only the member itself may renounce.
    pub fn decide_renounce(
        &self,
        caller: Address,
        role: &Role,
        account: Address,
        occurred_at: DateTime<Utc>,
    ) -> LedgerResult<Option<RoleEvent>> {
        if caller != account {
            return Err(LedgerError::permission_denied(caller, role.as_str()));
        }
        Ok(self.revocation(caller, role, account, occurred_at))
    }

    /// Grant without a permission check.
    ///
    /// Only for genesis wiring, where no admin exists yet.
    pub fn bootstrap_grant(
        &self,
        sender: Address,
        role: &Role,
        account: Address,
        occurred_at: DateTime<Utc>,
    ) -> Option<RoleEvent> {
        if self.has_role(role, account) {
            return None;
        }
        Some(RoleEvent::RoleGranted(RoleGranted {
            role: role.clone(),
            account,
            sender,
            occurred_at,
        }))
    }

    /// Change the administering role of `role` without a permission check.
    ///
    /// Only for genesis wiring.
    pub fn decide_set_role_admin(
        &self,
        role: &Role,
        new_admin: &Role,
        occurred_at: DateTime<Utc>,
    ) -> RoleEvent {
        RoleEvent::RoleAdminChanged(RoleAdminChanged {
            role: role.clone(),
            previous_admin: self.role_admin(role),
            new_admin: new_admin.clone(),
            occurred_at,
        })
    }

    fn revocation(
        &self,
        sender: Address,
        role: &Role,
        account: Address,
        occurred_at: DateTime<Utc>,
    ) -> Option<RoleEvent> {
        if !self.has_role(role, account) {
            return None;
        }
        Some(RoleEvent::RoleRevoked(RoleRevoked {
            role: role.clone(),
            account,
            sender,
            occurred_at,
        }))
    }

    pub fn apply(&mut self, event: &RoleEvent) {
        match event {
            RoleEvent::RoleGranted(e) => {
                self.members
                    .entry(e.role.clone())
                    .or_default()
                    .insert(e.account);
            }
            RoleEvent::RoleRevoked(e) => {
                if let Some(members) = self.members.get_mut(&e.role) {
                    members.remove(&e.account);
                    if members.is_empty() {
                        self.members.remove(&e.role);
                    }
                }
            }
            RoleEvent::RoleAdminChanged(e) => {
                self.admins.insert(e.role.clone(), e.new_admin.clone());
            }
        }
    }

    pub fn grant_role(
        &mut self,
        caller: Address,
        role: &Role,
        account: Address,
        occurred_at: DateTime<Utc>,
    ) -> LedgerResult<Option<RoleEvent>> {
        let event = self.decide_grant(caller, role, account, occurred_at)?;
        self.apply_decided(event.as_ref());
        Ok(event)
    }

    pub fn revoke_role(
        &mut self,
        caller: Address,
        role: &Role,
        account: Address,
        occurred_at: DateTime<Utc>,
    ) -> LedgerResult<Option<RoleEvent>> {
        let event = self.decide_revoke(caller, role, account, occurred_at)?;
        self.apply_decided(event.as_ref());
        Ok(event)
    }

    pub fn renounce_role(
        &mut self,
        caller: Address,
        role: &Role,
        account: Address,
        occurred_at: DateTime<Utc>,
    ) -> LedgerResult<Option<RoleEvent>> {
        let event = self.decide_renounce(caller, role, account, occurred_at)?;
        self.apply_decided(event.as_ref());
        Ok(event)
    }

    fn apply_decided(&mut self, event: Option<&RoleEvent>) {
        if let Some(event) = event {
            self.apply(event);
        }
    }
}
