//! Service-level errors.

use common::OrderId;
use domain::ConsistencyError;
use rules::{RuleError, ValidationError};
use thiserror::Error;
use workflow::{SideEffectError, WorkflowError};

/// Errors from the persistence collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A guarded update found its precondition violated (e.g. insufficient
    /// stock for an adjustment).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The store is unavailable (also used for injected test failures).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Top-level error for the order service use cases.
///
/// The taxonomy mirrors the propagation policy: validation, rule, transition
/// and consistency errors are deterministic and surface verbatim; side-effect
/// and storage errors may warrant compensation or a retry by the caller.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed or out-of-range input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Well-formed input forbidden by business policy.
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// The placement check collected one or more rule violations.
    #[error("order cannot be placed: {}", .errors.join("; "))]
    PlacementRejected { errors: Vec<String> },

    /// A cross-field invariant is broken.
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    /// The workflow rejected or failed a transition.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// A side effect failed outside a transition (e.g. during creation).
    #[error(transparent)]
    SideEffect(#[from] SideEffectError),

    /// The persistence collaborator failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// No order exists under the given public id.
    #[error("order {0} was not found")]
    NotFound(OrderId),

    /// The order is already in a terminal state.
    #[error("order {id} is already {status}")]
    AlreadyClosed { id: OrderId, status: String },

    /// No advance payment is awaited on the order.
    #[error("no advance payment is awaited on {0}")]
    NoAdvanceDue(OrderId),
}
