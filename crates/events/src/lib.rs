//! Typed publish/subscribe event bus.
//!
//! Decouples side effects (notifications, audit, stock watching) from the
//! state machine that triggers them. Emission is synchronous and
//! fire-and-forget: a failing subscriber is logged and skipped, never
//! escalated to the publisher. Every published event is also appended to a
//! bounded ring history for audit and inspection.

mod bus;
mod name;
mod payloads;
mod record;
mod subscriber;

pub use bus::{EventBus, MAX_HISTORY};
pub use name::{EventCategory, EventName};
pub use payloads::{BusinessErrorData, StateTransitionData, StockLevelData};
pub use record::{EventId, EventRecord};
pub use subscriber::{Interest, Subscriber, SubscriberError};
