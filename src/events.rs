//! Change notifications for service records
//!
//! The record service publishes a [`ChangeEvent`] after every successful
//! mutation. Presentation code subscribes a callback and recomputes whatever
//! it shows; the aggregation core never subscribes and holds no state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::ServiceId;

/// What changed in the record store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A record was created or modified
    ServicesUpdated { id: ServiceId },
    /// A record was deleted
    ServiceRemoved { id: ServiceId },
}

impl ChangeEvent {
    pub fn service_id(&self) -> ServiceId {
        match self {
            Self::ServicesUpdated { id } | Self::ServiceRemoved { id } => *id,
        }
    }
}

/// Handle returned by [`ChangeBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Registry of change callbacks
#[derive(Default)]
pub struct ChangeBus {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(SubscriptionId, Callback)>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn subscribers(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Callback)>> {
        // Callbacks never run while this lock is held
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a callback for every future event
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers().push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback; returns false if it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers();
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        subscribers.len() != before
    }

    /// Deliver an event to every subscriber, in subscription order
    ///
    /// Callbacks run on a snapshot of the list, so they may subscribe or
    /// unsubscribe without deadlocking.
    pub fn publish(&self, event: ChangeEvent) {
        let snapshot: Vec<Callback> = self
            .subscribers()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        tracing::debug!(?event, subscribers = snapshot.len(), "publishing change");
        for callback in snapshot {
            callback(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers().len()
    }
}
