//! Lifecycle event types and listener registration
//!
//! One submission produces a stream of tagged notifications alongside its
//! terminal result. Listeners are consulted at emission time only: events
//! that fired before a listener was attached for a tag are not redelivered.

use ethers::types::{TransactionReceipt, H256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::ClientError;
use crate::tx::request::SubmitPayload;

/// Lifecycle stage tags, one per event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTag {
    Sending,
    Sent,
    TransactionHash,
    Receipt,
    Confirmation,
    Error,
}

impl EventTag {
    /// Get the wire-style tag name
    pub fn name(&self) -> &'static str {
        match self {
            EventTag::Sending => "sending",
            EventTag::Sent => "sent",
            EventTag::TransactionHash => "transactionHash",
            EventTag::Receipt => "receipt",
            EventTag::Confirmation => "confirmation",
            EventTag::Error => "error",
        }
    }
}

/// A lifecycle notification with the data relevant to its stage
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    /// Fired with the fully formatted payload before broadcast begins
    Sending(SubmitPayload),
    /// Fired once the broadcast call has been accepted
    Sent(SubmitPayload),
    /// The hash under which the network tracks this transaction
    TransactionHash(H256),
    /// The transaction was included in a block
    Receipt(TransactionReceipt),
    /// One more block observed on top of the inclusion block
    Confirmation(u64),
    /// The submission (or its confirmation watch) failed
    Error(ClientError),
}

impl LifecycleEvent {
    pub fn tag(&self) -> EventTag {
        match self {
            LifecycleEvent::Sending(_) => EventTag::Sending,
            LifecycleEvent::Sent(_) => EventTag::Sent,
            LifecycleEvent::TransactionHash(_) => EventTag::TransactionHash,
            LifecycleEvent::Receipt(_) => EventTag::Receipt,
            LifecycleEvent::Confirmation(_) => EventTag::Confirmation,
            LifecycleEvent::Error(_) => EventTag::Error,
        }
    }

    pub fn name(&self) -> &'static str {
        self.tag().name()
    }
}

/// A registered event callback
pub type Listener = Arc<dyn Fn(&LifecycleEvent) + Send + Sync>;

/// Listener registrations keyed by tag, consulted at emission time only.
///
/// There is no replay buffer: emission delivers to the listeners registered
/// at that instant, at most once each. Callbacks run inline on the emitting
/// task with the table lock released, so a callback may register further
/// listeners; those take effect from the next emission.
#[derive(Default)]
pub struct ListenerTable {
    inner: Mutex<HashMap<EventTag, Vec<Listener>>>,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, tag: EventTag, listener: Listener) {
        self.inner
            .lock()
            .expect("listener table poisoned")
            .entry(tag)
            .or_default()
            .push(listener);
    }

    /// Whether any listener is registered for a tag
    pub fn has(&self, tag: EventTag) -> bool {
        self.inner
            .lock()
            .expect("listener table poisoned")
            .get(&tag)
            .map(|listeners| !listeners.is_empty())
            .unwrap_or(false)
    }

    /// Deliver an event to every listener currently registered for its tag
    pub fn emit(&self, event: &LifecycleEvent) {
        // Snapshot the matching listeners so callbacks run without the
        // table lock and can register listeners of their own.
        let matching: Vec<Listener> = {
            let table = self.inner.lock().expect("listener table poisoned");
            table.get(&event.tag()).cloned().unwrap_or_default()
        };
        for listener in matching {
            listener(event);
        }
    }
}
