//! Advance-payment rules for custom orders.

use common::Money;
use domain::CustomOrder;

use crate::config::AdvanceConfig;

/// An advance is required when the estimate is above the price threshold, the
/// special-requirements text is long, or the cake is multi-tier.
pub(crate) fn advance_required(config: &AdvanceConfig, order: &CustomOrder) -> bool {
    order
        .estimated_price
        .is_some_and(|price| price > config.price_threshold)
        || order.requirements.chars().count() > config.requirements_limit
        || order.cake_size.is_multi_tier()
}

/// The advance due for an estimate: a configured fraction with a floor.
pub(crate) fn advance_amount(config: &AdvanceConfig, estimated: Money) -> Money {
    estimated.scale(config.fraction).max(config.minimum)
}
