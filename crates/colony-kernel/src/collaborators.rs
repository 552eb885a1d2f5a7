//! External collaborators the colony consumes through traits.
//!
//! The kernel never holds tokens, verifies signatures itself, indexes events
//! or runs reputation mining. It reaches those systems through the traits in
//! this module; the in-memory implementations back tests and the CLI.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use colony_types::{ActorId, Amount, TokenId};
use thiserror::Error;
use tracing::info;

pub use colony_tasks::{Ed25519Verifier, SignatureVerifier};

use crate::events::ColonyEvent;

/// Why a token transfer did not happen.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferFailure {
    #[error("{holder} holds {available} {token}, needs {required}")]
    InsufficientFunds {
        holder: ActorId,
        token: TokenId,
        required: Amount,
        available: Amount,
    },

    #[error("{token} balance overflow for {holder}")]
    Overflow { holder: ActorId, token: TokenId },

    #[error("token ledger unavailable: {0}")]
    Unavailable(String),
}

/// Token accounting outside the colony.
pub trait TokenTransfer: Send + Sync {
    fn transfer(
        &self,
        token: &TokenId,
        from: &ActorId,
        to: &ActorId,
        amount: Amount,
    ) -> Result<(), TransferFailure>;

    fn mint(&self, token: &TokenId, to: &ActorId, amount: Amount) -> Result<(), TransferFailure>;

    fn balance_of(&self, token: &TokenId, holder: &ActorId) -> Amount;
}

/// Fire-and-forget event delivery.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &ColonyEvent);
}

/// The reputation mining cycle.
pub trait ReputationCycle: Send + Sync {
    /// Number of reputation updates logged in the current cycle.
    fn update_log_length(&self) -> u64;

    /// Close the current cycle and open the next; returns the new cycle number.
    fn start_next_cycle(&self) -> u64;
}

/// Token balances held in memory.
pub struct InMemoryTokenLedger {
    balances: Mutex<HashMap<(TokenId, ActorId), Amount>>,
}

impl InMemoryTokenLedger {
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryTokenLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenTransfer for InMemoryTokenLedger {
    fn transfer(
        &self,
        token: &TokenId,
        from: &ActorId,
        to: &ActorId,
        amount: Amount,
    ) -> Result<(), TransferFailure> {
        let mut balances = self
            .balances
            .lock()
            .map_err(|e| TransferFailure::Unavailable(e.to_string()))?;

        let available = balances.get(&(token.clone(), *from)).copied().unwrap_or(0);
        if available < amount {
            return Err(TransferFailure::InsufficientFunds {
                holder: *from,
                token: token.clone(),
                required: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let received = balances.get(&(token.clone(), *to)).copied().unwrap_or(0);
        let received = received
            .checked_add(amount)
            .ok_or_else(|| TransferFailure::Overflow {
                holder: *to,
                token: token.clone(),
            })?;

        balances.insert((token.clone(), *from), available - amount);
        balances.insert((token.clone(), *to), received);
        Ok(())
    }

    fn mint(&self, token: &TokenId, to: &ActorId, amount: Amount) -> Result<(), TransferFailure> {
        let mut balances = self
            .balances
            .lock()
            .map_err(|e| TransferFailure::Unavailable(e.to_string()))?;
        let entry = balances.entry((token.clone(), *to)).or_default();
        *entry = entry.checked_add(amount).ok_or_else(|| TransferFailure::Overflow {
            holder: *to,
            token: token.clone(),
        })?;
        info!(token = %token, to = %to, amount = amount, "Tokens minted");
        Ok(())
    }

    fn balance_of(&self, token: &TokenId, holder: &ActorId) -> Amount {
        self.balances
            .lock()
            .map(|b| b.get(&(token.clone(), *holder)).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

/// Forwards colony events to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &ColonyEvent) {
        info!(
            event_id = %event.id,
            colony = %event.colony,
            event = event.kind.name(),
            detail = ?event.kind,
            "Colony event"
        );
    }
}

/// Keeps every emitted event, for tests and scripted runs.
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<ColonyEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ColonyEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Names of the recorded events, in emission order.
    pub fn names(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .map(|e| e.iter().map(|ev| ev.kind.name()).collect())
            .unwrap_or_default()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: &ColonyEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// A reputation cycle that only counts.
#[derive(Default)]
pub struct InMemoryReputationCycle {
    cycle: AtomicU64,
    log_length: AtomicU64,
}

impl InMemoryReputationCycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one update to the current cycle's log.
    pub fn record_update(&self) {
        self.log_length.fetch_add(1, Ordering::SeqCst);
    }

    pub fn current_cycle(&self) -> u64 {
        self.cycle.load(Ordering::SeqCst)
    }
}

impl ReputationCycle for InMemoryReputationCycle {
    fn update_log_length(&self) -> u64 {
        self.log_length.load(Ordering::SeqCst)
    }

    fn start_next_cycle(&self) -> u64 {
        self.log_length.store(0, Ordering::SeqCst);
        let next = self.cycle.fetch_add(1, Ordering::SeqCst) + 1;
        info!(cycle = next, "Reputation cycle started");
        next
    }
}

/// The collaborator set a colony is built with.
#[derive(Clone)]
pub struct Collaborators {
    pub tokens: Arc<dyn TokenTransfer>,
    pub verifier: Arc<dyn SignatureVerifier>,
    pub events: Arc<dyn EventSink>,
    pub reputation: Arc<dyn ReputationCycle>,
}

impl Collaborators {
    /// In-memory tokens and reputation, Ed25519 signatures, tracing events.
    pub fn in_memory() -> Self {
        Self {
            tokens: Arc::new(InMemoryTokenLedger::new()),
            verifier: Arc::new(Ed25519Verifier),
            events: Arc::new(TracingEventSink),
            reputation: Arc::new(InMemoryReputationCycle::new()),
        }
    }

    pub fn with_tokens(mut self, tokens: Arc<dyn TokenTransfer>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn SignatureVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn with_reputation(mut self, reputation: Arc<dyn ReputationCycle>) -> Self {
        self.reputation = reputation;
        self
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::in_memory()
    }
}
