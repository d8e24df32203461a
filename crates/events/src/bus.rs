//! The event bus.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::{EventId, EventName, EventRecord, Interest, Subscriber};

/// Maximum number of records kept in the audit history; the oldest record is
/// evicted first.
pub const MAX_HISTORY: usize = 1000;

struct Registration {
    interest: Interest,
    subscriber: Arc<dyn Subscriber>,
}

#[derive(Default)]
struct Inner {
    subscribers: Vec<Registration>,
    history: VecDeque<EventRecord>,
}

/// Synchronous publish/subscribe bus with a bounded audit history.
///
/// Delivery is fire-and-forget in registration order: a subscriber error is
/// logged and the remaining subscribers still receive the event. Publishing
/// never fails and never blocks on subscriber outcomes.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<RwLock<Inner>>,
}

impl EventBus {
    /// Creates a new bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber for the events matching `interest`.
    pub fn subscribe(&self, interest: Interest, subscriber: Arc<dyn Subscriber>) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.subscribers.push(Registration {
            interest,
            subscriber,
        });
    }

    /// Publishes an event, recording it in the history and fanning it out to
    /// every interested subscriber.
    pub fn publish<T: Serialize>(&self, name: EventName, data: &T) -> EventId {
        let data = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(event = %name, %error, "event payload failed to serialize");
                serde_json::Value::Null
            }
        };
        let record = EventRecord::new(name, data);
        let id = record.id;

        // Snapshot the interested subscribers while holding the lock, then
        // dispatch outside it so a handler may publish follow-up events.
        let interested: Vec<Arc<dyn Subscriber>> = {
            let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
            if inner.history.len() == MAX_HISTORY {
                inner.history.pop_front();
            }
            inner.history.push_back(record.clone());
            inner
                .subscribers
                .iter()
                .filter(|r| r.interest.matches(name))
                .map(|r| Arc::clone(&r.subscriber))
                .collect()
        };

        for subscriber in interested {
            if let Err(error) = subscriber.handle(&record) {
                tracing::warn!(
                    event = %name,
                    subscriber = subscriber.name(),
                    %error,
                    "event subscriber failed"
                );
            }
        }

        id
    }

    /// Returns the most recent `limit` records, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<EventRecord> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let skip = inner.history.len().saturating_sub(limit);
        inner.history.iter().skip(skip).cloned().collect()
    }

    /// Returns every historical record with the given name, oldest first.
    pub fn named(&self, name: EventName) -> Vec<EventRecord> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner
            .history
            .iter()
            .filter(|r| r.name == name)
            .cloned()
            .collect()
    }

    /// Returns the number of records currently held.
    pub fn history_len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.history.len()
    }
}
