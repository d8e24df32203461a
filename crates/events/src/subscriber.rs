//! Subscriber interfaces.

use thiserror::Error;

use crate::{EventCategory, EventName, EventRecord};

/// Error returned by a subscriber.
///
/// Subscriber failures are isolated: the bus logs them and continues with the
/// remaining subscribers. They never reach the publisher.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SubscriberError(String);

impl SubscriberError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for SubscriberError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for SubscriberError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

/// Which events a subscriber wants delivered.
#[derive(Debug, Clone)]
pub enum Interest {
    /// Every event.
    All,
    /// Every event in the given categories.
    Categories(Vec<EventCategory>),
    /// Exactly the listed names.
    Names(Vec<EventName>),
}

impl Interest {
    /// Returns true if the given event name matches this interest.
    pub fn matches(&self, name: EventName) -> bool {
        match self {
            Interest::All => true,
            Interest::Categories(categories) => categories.contains(&name.category()),
            Interest::Names(names) => names.contains(&name),
        }
    }
}

/// A collaborator that receives published events.
///
/// Implemented by notifiers, audit loggers, stock watchers and the like. The
/// core never depends on any particular subscriber being registered.
pub trait Subscriber: Send + Sync {
    /// A short name used in log lines when this subscriber fails.
    fn name(&self) -> &str;

    /// Handles one event. Errors are logged by the bus and swallowed.
    fn handle(&self, event: &EventRecord) -> Result<(), SubscriberError>;
}
