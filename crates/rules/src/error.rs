//! Rule violation errors.

use common::Money;
use thiserror::Error;

/// A request was well-formed but forbidden by business policy.
///
/// These are deterministic decisions: they surface verbatim to the caller and
/// are never retried.
#[derive(Debug, Error, PartialEq)]
pub enum RuleError {
    #[error("delivery date must be at least {minimum_days} day(s) in advance")]
    DeliveryTooSoon { minimum_days: i64 },

    #[error("delivery date cannot be more than {maximum_months} months ahead")]
    DeliveryTooFar { maximum_months: u32 },

    #[error("product {product_id} was not found")]
    ProductMissing { product_id: String },

    #[error("{name} is currently unavailable")]
    ProductInactive { name: String },

    #[error("insufficient stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: i64,
    },

    #[error("customer name must be between {min} and {max} characters")]
    InvalidName { min: usize, max: usize },

    #[error("invalid email address: {email}")]
    InvalidEmail { email: String },

    #[error("invalid Sri Lankan phone number: {phone}")]
    InvalidPhone { phone: String },

    #[error("address must include a street and a city")]
    IncompleteAddress,

    #[error("address must be at least {minimum} characters")]
    AddressTooShort { minimum: usize },

    #[error("an estimated price must be set before confirmation")]
    EstimatedPriceMissing,

    #[error("advance payment of {amount} is still outstanding")]
    AdvanceOutstanding { amount: Money },

    #[error("online transfer payment has not been initiated")]
    PaymentNotInitiated,

    #[error("transition {from} -> {to} is not permitted for {entity}")]
    TransitionDisallowed {
        entity: &'static str,
        from: String,
        to: String,
    },
}
