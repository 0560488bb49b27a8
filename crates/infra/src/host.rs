//! Serialized, persisted execution of ledger commands.
//!
//! ```text
//! Command
//!   ↓
//! 1. Lock the live ledger (one writer at a time)
//!   ↓
//! 2. Decide events (pure `handle`, no mutation)
//!   ↓
//! 3. Append to the EventLog with `ExpectedVersion::Exact(version)`
//!   ↓
//! 4. Apply the events to the live ledger
//!   ↓
//! 5. Publish committed envelopes to the bus
//! ```
//!
//! A rejected command stops at step 2: nothing is appended, applied or
//! published. A failed append stops at step 3 with the ledger untouched.
//! Once step 3 succeeds the command has happened and `execute` returns `Ok`;
//! a bus failure in step 5 only leaves those events behind the publication
//! cursor, to be sent before the next command's events or by
//! `publish_pending`.

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use spacedao_core::{Aggregate, AggregateRoot, ExpectedVersion, LedgerError, LedgerId};
use spacedao_events::{Event, EventBus, EventEnvelope};

use crate::config::HostConfig;
use crate::event_store::{EventStore, EventStoreError, StoredEvent, UncommittedEvent};

#[derive(Debug, Error)]
pub enum HostError {
    /// The ledger rejected the command.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] EventStoreError),

    /// A stored payload could not be decoded into the ledger's event type.
    #[error("failed to decode stored event {sequence_number}: {message}")]
    Deserialize { sequence_number: u64, message: String },

    /// The bus refused an event. Only returned by the explicit publication
    /// calls; the events stay durable in the store.
    #[error("event publication failed: {0}")]
    Publish(String),

    #[error("ledger lock poisoned")]
    Poisoned,
}

#[derive(Debug)]
struct HostState<A> {
    ledger: A,
    /// Sequence number of the last event handed to the bus.
    published_through: u64,
}

/// Single-writer executor owning one live ledger aggregate.
///
/// All commands against the ledger go through `execute`, which serializes
/// them behind a mutex so each one observes the state left by the previous.
#[derive(Debug)]
pub struct LedgerHost<A, S, B> {
    aggregate_type: String,
    state: Mutex<HostState<A>>,
    store: S,
    bus: B,
    config: HostConfig,
}

impl<A, S, B> LedgerHost<A, S, B>
where
    A: Aggregate<Error = LedgerError> + AggregateRoot<Id = LedgerId>,
    A::Event: Event + Serialize + DeserializeOwned,
    S: EventStore,
    B: EventBus<EventEnvelope<JsonValue>>,
{
    /// Host a ledger that has no history yet (typically `Ledger::empty(id)`).
    pub fn new(
        ledger: A,
        aggregate_type: impl Into<String>,
        store: S,
        bus: B,
        config: HostConfig,
    ) -> Self {
        let published_through = ledger.version();
        Self {
            aggregate_type: aggregate_type.into(),
            state: Mutex::new(HostState {
                ledger,
                published_through,
            }),
            store,
            bus,
            config,
        }
    }

    /// Rebuild a host by replaying the ledger's stream onto `empty`.
    ///
    /// The replayed stream counts as already published; use `republish` to
    /// send it to consumers again.
    pub fn restore(
        empty: A,
        aggregate_type: impl Into<String>,
        store: S,
        bus: B,
        config: HostConfig,
    ) -> Result<Self, HostError> {
        let aggregate_type = aggregate_type.into();
        let mut ledger = empty;
        let ledger_id = *ledger.id();

        let history = store.load_stream(ledger_id)?;
        for stored in &history {
            replay_one(&mut ledger, &aggregate_type, stored)?;
        }

        info!(
            ledger = %ledger_id,
            aggregate_type = %aggregate_type,
            events = history.len(),
            version = ledger.version(),
            "ledger restored from event store"
        );

        Ok(Self::new(ledger, aggregate_type, store, bus, config))
    }

    /// Execute one command as an atomic transition.
    ///
    /// Returns the committed events; empty when the command was accepted but
    /// changed nothing (e.g. granting a role to an existing member). An `Err`
    /// always means nothing was committed, so the command may be retried.
    pub fn execute(&self, command: &A::Command) -> Result<Vec<StoredEvent>, HostError> {
        let mut state = self.lock()?;
        let ledger_id = *state.ledger.id();

        let decided = match state.ledger.handle(command) {
            Ok(events) => events,
            Err(err) => {
                warn!(ledger = %ledger_id, error = %err, "command rejected");
                return Err(err.into());
            }
        };
        if decided.is_empty() {
            debug!(ledger = %ledger_id, "command accepted with no events");
            return Ok(vec![]);
        }

        let uncommitted = decided
            .iter()
            .map(|ev| {
                UncommittedEvent::from_typed(
                    ledger_id,
                    self.aggregate_type.clone(),
                    Uuid::now_v7(),
                    ev,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let version = state.ledger.version();
        let committed = self
            .store
            .append(uncommitted, ExpectedVersion::Exact(version))?;

        for ev in &decided {
            state.ledger.apply(ev);
        }

        debug!(
            ledger = %ledger_id,
            events = committed.len(),
            version = state.ledger.version(),
            "command executed"
        );

        // Still holding the lock so envelopes reach the bus in stream order.
        if self.config.publish_events {
            let behind = state.published_through < version;
            let sent = if behind {
                self.publish_pending_locked(&mut state)
            } else {
                self.publish_locked(&mut state, &committed)
            };
            if let Err(err) = sent {
                warn!(
                    ledger = %ledger_id,
                    error = %err,
                    "publication deferred; events are committed"
                );
            }
        }

        Ok(committed)
    }

    /// Run a read-only query against the live ledger.
    pub fn read<R>(&self, query: impl FnOnce(&A) -> R) -> Result<R, HostError> {
        let state = self.lock()?;
        Ok(query(&state.ledger))
    }

    pub fn ledger_id(&self) -> Result<LedgerId, HostError> {
        self.read(|ledger| *ledger.id())
    }

    pub fn version(&self) -> Result<u64, HostError> {
        self.read(|ledger| ledger.version())
    }

    /// Number of committed events not yet handed to the bus.
    pub fn unpublished(&self) -> Result<u64, HostError> {
        let state = self.lock()?;
        Ok(state.ledger.version() - state.published_through)
    }

    /// Send every committed event past the publication cursor.
    pub fn publish_pending(&self) -> Result<usize, HostError> {
        let mut state = self.lock()?;
        self.publish_pending_locked(&mut state)
    }

    /// The full persisted stream of this ledger.
    pub fn history(&self) -> Result<Vec<StoredEvent>, HostError> {
        Ok(self.store.load_stream(self.ledger_id()?)?)
    }

    /// Publish every stored event after `after_sequence` again, regardless
    /// of the publication cursor. Consumers see those events at least once.
    pub fn republish(&self, after_sequence: u64) -> Result<usize, HostError> {
        let mut state = self.lock()?;
        let pending: Vec<StoredEvent> = self
            .store
            .load_stream(*state.ledger.id())?
            .into_iter()
            .filter(|e| e.sequence_number > after_sequence)
            .collect();
        self.publish_locked(&mut state, &pending)
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    fn lock(&self) -> Result<MutexGuard<'_, HostState<A>>, HostError> {
        self.state.lock().map_err(|_| HostError::Poisoned)
    }

    fn publish_pending_locked(&self, state: &mut HostState<A>) -> Result<usize, HostError> {
        if state.published_through >= state.ledger.version() {
            return Ok(0);
        }
        let cursor = state.published_through;
        let pending: Vec<StoredEvent> = self
            .store
            .load_stream(*state.ledger.id())?
            .into_iter()
            .filter(|e| e.sequence_number > cursor)
            .collect();
        self.publish_locked(state, &pending)
    }

    fn publish_locked(
        &self,
        state: &mut HostState<A>,
        events: &[StoredEvent],
    ) -> Result<usize, HostError> {
        for stored in events {
            if let Err(err) = self.bus.publish(stored.to_envelope()) {
                error!(
                    ledger = %stored.ledger_id,
                    sequence = stored.sequence_number,
                    error = ?err,
                    "event publication failed after append"
                );
                return Err(HostError::Publish(format!("{err:?}")));
            }
            state.published_through = state.published_through.max(stored.sequence_number);
        }
        Ok(events.len())
    }
}

fn replay_one<A>(
    ledger: &mut A,
    aggregate_type: &str,
    stored: &StoredEvent,
) -> Result<(), HostError>
where
    A: Aggregate + AggregateRoot<Id = LedgerId>,
    A::Event: DeserializeOwned,
{
    if stored.ledger_id != *ledger.id() {
        return Err(EventStoreError::InvalidAppend(format!(
            "loaded stream contains foreign ledger_id at sequence {}",
            stored.sequence_number
        ))
        .into());
    }
    if stored.aggregate_type != aggregate_type {
        return Err(EventStoreError::AggregateTypeMismatch(format!(
            "stream aggregate_type is '{}', expected '{aggregate_type}'",
            stored.aggregate_type
        ))
        .into());
    }
    let expected = ledger.version() + 1;
    if stored.sequence_number != expected {
        return Err(EventStoreError::InvalidAppend(format!(
            "gap in loaded stream (expected sequence {expected}, found {})",
            stored.sequence_number
        ))
        .into());
    }

    let event: A::Event =
        serde_json::from_value(stored.payload.clone()).map_err(|e| HostError::Deserialize {
            sequence_number: stored.sequence_number,
            message: e.to_string(),
        })?;
    ledger.apply(&event);
    Ok(())
}
