//! `spacedao-access`: role-based permission registry.
//!
//! Pure domain logic: decides and records role membership changes. Ledgers
//! embed an [`AccessControlRegistry`] and check it at the top of each gated
//! operation.

pub mod events;
pub mod registry;
pub mod role;

pub use events::{RoleAdminChanged, RoleEvent, RoleGranted, RoleRevoked};
pub use registry::AccessControlRegistry;
pub use role::{BURNER_ROLE, DEFAULT_ADMIN_ROLE, MINTER_ROLE, Role};
