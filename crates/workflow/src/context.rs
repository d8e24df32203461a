//! Transition context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller-supplied context accompanying a transition: who asked for it, why,
/// and when. Carried into the `stateTransition` event and into cancellation
/// notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionContext {
    pub reason: Option<String>,
    pub actor: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl TransitionContext {
    /// An empty context stamped with the current time.
    pub fn new() -> Self {
        Self {
            reason: None,
            actor: None,
            occurred_at: Utc::now(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

impl Default for TransitionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_style() {
        let ctx = TransitionContext::new()
            .with_reason("customer request")
            .with_actor("admin");
        assert_eq!(ctx.reason.as_deref(), Some("customer request"));
        assert_eq!(ctx.actor.as_deref(), Some("admin"));
    }
}
