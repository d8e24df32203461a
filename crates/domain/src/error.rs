//! Cross-field consistency errors.

use common::Money;
use thiserror::Error;

/// A cross-field invariant is broken on an aggregate.
///
/// These indicate a bug or a bad merge, never bad user input; they are raised
/// before persistence and never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsistencyError {
    /// A line item's subtotal does not equal price × quantity.
    #[error("item {product_id}: subtotal {subtotal} != {unit_price} x {quantity}")]
    ItemSubtotal {
        product_id: String,
        unit_price: Money,
        quantity: u32,
        subtotal: Money,
    },

    /// The pricing subtotal does not equal the sum of item subtotals.
    #[error("pricing subtotal {subtotal} does not match item sum {item_sum}")]
    SubtotalMismatch { subtotal: Money, item_sum: Money },

    /// The total does not equal subtotal + delivery fee.
    #[error("total {total} != subtotal {subtotal} + delivery fee {delivery_fee}")]
    TotalMismatch {
        subtotal: Money,
        delivery_fee: Money,
        total: Money,
    },

    /// An advance amount is set but the advance status says none is required.
    #[error("advance amount {amount} is set while advance status is not_required")]
    AdvanceWithoutRequirement { amount: Money },

    /// The advance status implies an amount but none (or zero) is set.
    #[error("advance status {status} requires a positive advance amount")]
    RequirementWithoutAdvance { status: String },

    /// The advance exceeds the estimated price.
    #[error("advance {advance} exceeds estimated price {estimate}")]
    AdvanceExceedsEstimate { advance: Money, estimate: Money },
}
