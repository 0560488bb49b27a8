use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier used for RBAC.
///
/// Roles are opaque names; what a role permits is decided by the ledger that
/// checks it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

/// Administers every role that has not been given another admin.
pub const DEFAULT_ADMIN_ROLE: Role = Role::from_static("DEFAULT_ADMIN_ROLE");

/// May mint governed balances.
pub const MINTER_ROLE: Role = Role::from_static("MINTER_ROLE");

/// May burn governed balances (custodially).
pub const BURNER_ROLE: Role = Role::from_static("BURNER_ROLE");

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
