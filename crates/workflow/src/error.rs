//! Workflow errors.

use thiserror::Error;

use crate::EntityKind;

/// A downstream action failed after the core decision was already made.
///
/// Unlike rule violations these are not deterministic: the caller decides
/// whether to retry, compensate, or surface them.
#[derive(Debug, Error)]
pub enum SideEffectError {
    /// A stock adjustment could not be applied.
    #[error("stock adjustment failed for {product_id}: {message}")]
    Stock { product_id: String, message: String },

    /// The payment gateway could not be consulted.
    #[error("payment gateway lookup failed for {order_id}: {message}")]
    PaymentLookup { order_id: String, message: String },

    /// The persistence collaborator failed mid-action.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Errors raised by the transition engine.
///
/// The first two variants are deterministic validation failures and are never
/// retried; side-effect errors propagate from entry actions and leave
/// compensation to the caller.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The state machine has no edge from the current state to the target.
    #[error("illegal {entity} transition: {from} -> {to}")]
    IllegalTransition {
        entity: EntityKind,
        from: &'static str,
        to: &'static str,
    },

    /// A business rule rejected the transition or one of its pre-entry
    /// validations failed.
    #[error(transparent)]
    RuleViolation(#[from] rules::RuleError),

    /// An entry/exit action's side effect failed.
    #[error(transparent)]
    SideEffect(#[from] SideEffectError),
}
