//! Infrastructure layer: event store, single-writer ledger host, config.

pub mod config;
pub mod event_store;
pub mod host;


pub use config::HostConfig;
pub use event_store::{
    EventStore, EventStoreError, InMemoryEventStore, StoredEvent, UncommittedEvent,
};
pub use host::{HostError, LedgerHost};
