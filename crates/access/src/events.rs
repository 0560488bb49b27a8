use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use spacedao_core::Address;
use spacedao_events::Event;

use crate::Role;

/// Event: RoleGranted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGranted {
    pub role: Role,
    pub account: Address,
    pub sender: Address,
    pub occurred_at: DateTime<Utc>,
}

/// Event: RoleRevoked (also emitted on renunciation, with `sender == account`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRevoked {
    pub role: Role,
    pub account: Address,
    pub sender: Address,
    pub occurred_at: DateTime<Utc>,
}

/// Event: RoleAdminChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAdminChanged {
    pub role: Role,
    pub previous_admin: Role,
    pub new_admin: Role,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleEvent {
    RoleGranted(RoleGranted),
    RoleRevoked(RoleRevoked),
    RoleAdminChanged(RoleAdminChanged),
}

impl Event for RoleEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RoleEvent::RoleGranted(_) => "access.role_granted",
            RoleEvent::RoleRevoked(_) => "access.role_revoked",
            RoleEvent::RoleAdminChanged(_) => "access.role_admin_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            RoleEvent::RoleGranted(e) => e.occurred_at,
            RoleEvent::RoleRevoked(e) => e.occurred_at,
            RoleEvent::RoleAdminChanged(e) => e.occurred_at,
        }
    }
}
