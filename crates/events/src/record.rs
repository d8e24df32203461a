//! Event records as kept in the bus history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EventName;

/// Unique identifier for an emitted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A published event together with its audit metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique identifier for this emission.
    pub id: EventId,

    /// The event name.
    pub name: EventName,

    /// The event payload as JSON.
    pub data: serde_json::Value,

    /// When the event was published.
    pub timestamp: DateTime<Utc>,
}

impl EventRecord {
    /// Creates a record stamped with the current time.
    pub fn new(name: EventName, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            name,
            data,
            timestamp: Utc::now(),
        }
    }
}
