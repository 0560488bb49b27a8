//! `spacedao-core`: ledger foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the aggregate execution traits, identifiers, amounts and the error taxonomy
//! shared by every ledger.

pub mod aggregate;
pub mod amount;
pub mod error;
pub mod id;
pub mod time;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use amount::{Amount, units};
pub use error::{LedgerError, LedgerResult};
pub use id::{Address, LedgerId};
pub use time::unix_seconds;
