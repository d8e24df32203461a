//! Status transition tables.
//!
//! These are the rules engine's own copy of the three lifecycle graphs. The
//! workflow crate holds the authoritative graphs and cross-checks every
//! transition against this table; the two must agree pair-for-pair, which the
//! workflow crate's tests assert exhaustively.

use domain::{CustomOrderStatus, OrderStatus, PaymentStatus};

pub(crate) fn order_allowed(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed)
            | (Pending, Cancelled)
            | (Confirmed, Preparing)
            | (Confirmed, Cancelled)
            | (Preparing, Ready)
            | (Preparing, Cancelled)
            | (Ready, Delivered)
    )
}

pub(crate) fn custom_order_allowed(from: CustomOrderStatus, to: CustomOrderStatus) -> bool {
    use CustomOrderStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed)
            | (Pending, Cancelled)
            | (Confirmed, InProgress)
            | (Confirmed, Cancelled)
            | (InProgress, Completed)
            | (InProgress, Cancelled)
    )
}

pub(crate) fn payment_allowed(from: PaymentStatus, to: PaymentStatus) -> bool {
    use PaymentStatus::*;
    matches!(
        (from, to),
        (Pending, Paid) | (Pending, Failed) | (Paid, Refunded) | (Failed, Pending)
    )
}
