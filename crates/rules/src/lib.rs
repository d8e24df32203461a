//! The business rules engine.
//!
//! A [`Rules`] value wraps an immutable [`RuleConfig`] built once at startup
//! and injected wherever rule decisions are needed — there is no ambient
//! global registry, so tests construct isolated instances freely. Rules are
//! pure: they read entity snapshots and primitives, and report violations as
//! [`RuleError`]s with rule-specific messages.

mod advance;
mod config;
mod customer;
mod error;
mod fees;
mod notice;
mod placement;
mod stock;
mod transitions;
mod validators;

pub use config::{AdvanceConfig, DeliveryFeeConfig, NoticeConfig, RuleConfig, ZoneConfig};
pub use error::RuleError;
pub use fees::{DeliveryQuote, FeeBreakdown};
pub use placement::PlacementCheck;
pub use validators::ValidationError;

use std::collections::HashMap;

use chrono::NaiveDate;
use common::{Money, ProductId};
use domain::{
    CustomOrder, CustomOrderStatus, CustomOrderUpdate, CustomerInfo, DeliveryOptions,
    NewCustomOrderRequest, NewOrderRequest, OrderStatus, PaymentStatus, Product,
};

/// The rule set, parameterized by an immutable configuration.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    config: RuleConfig,
}

impl Rules {
    /// Creates a rule set over the given configuration.
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    // ----- advance notice ---------------------------------------------------

    /// Standard orders must be delivered no earlier than tomorrow
    /// (date-only comparison, time of day is discarded upstream).
    pub fn check_retail_notice(&self, delivery: NaiveDate, today: NaiveDate) -> Result<(), RuleError> {
        notice::check_min_notice(delivery, today, self.config.notice.retail_min_days)
    }

    /// Custom orders need at least seven days of notice and may not be
    /// scheduled more than six months out.
    pub fn check_custom_window(&self, delivery: NaiveDate, today: NaiveDate) -> Result<(), RuleError> {
        notice::check_min_notice(delivery, today, self.config.notice.custom_min_days)?;
        notice::check_max_window(delivery, today, self.config.notice.custom_max_months)
    }

    // ----- stock ------------------------------------------------------------

    /// Availability at placement time: on-hand minus existing holds, unless
    /// the product is made to order. Inactive products always fail.
    pub fn check_stock(&self, product: &Product, requested: u32) -> Result<(), RuleError> {
        stock::check_available(product, requested)
    }

    /// On-hand re-check at confirmation time, when the order already holds
    /// its own reservation.
    pub fn check_stock_on_hand(&self, product: &Product, requested: u32) -> Result<(), RuleError> {
        stock::check_on_hand(product, requested)
    }

    // ----- delivery fees ----------------------------------------------------

    /// Quotes the delivery fee for a subtotal, city and options.
    ///
    /// This is the single fee calculator: the legacy flat rate survives only
    /// as the catch-all zone's configuration, so the default-options case
    /// reproduces it exactly.
    pub fn delivery_quote(
        &self,
        subtotal: Money,
        city: &str,
        options: &DeliveryOptions,
    ) -> DeliveryQuote {
        fees::quote(&self.config.delivery, subtotal, city, options)
    }

    // ----- advance payments -------------------------------------------------

    /// Returns true when a custom order requires an advance payment.
    pub fn advance_required(&self, order: &CustomOrder) -> bool {
        advance::advance_required(&self.config.advance, order)
    }

    /// The advance amount due for an estimated price.
    pub fn advance_amount(&self, estimated: Money) -> Money {
        advance::advance_amount(&self.config.advance, estimated)
    }

    // ----- customer info ----------------------------------------------------

    /// Validates a contact snapshot; the first failing field short-circuits.
    pub fn check_customer_info(&self, info: &CustomerInfo) -> Result<(), RuleError> {
        customer::check_customer_info(info)
    }

    // ----- transition tables ------------------------------------------------
    //
    // Independent copies of the workflow graphs, cross-checked on every
    // transition (workflow step 4). Must agree with the graphs in the
    // workflow crate; agreement is asserted by that crate's tests.

    pub fn order_transition_allowed(&self, from: OrderStatus, to: OrderStatus) -> bool {
        transitions::order_allowed(from, to)
    }

    pub fn custom_order_transition_allowed(
        &self,
        from: CustomOrderStatus,
        to: CustomOrderStatus,
    ) -> bool {
        transitions::custom_order_allowed(from, to)
    }

    pub fn payment_transition_allowed(&self, from: PaymentStatus, to: PaymentStatus) -> bool {
        transitions::payment_allowed(from, to)
    }

    // ----- placement --------------------------------------------------------

    /// Checks whether an order may be placed, translating every rule failure
    /// into a human-readable message.
    ///
    /// Items whose product snapshot is present in `products` are stock-checked
    /// here; the rest are resolved (and re-checked) by the order service.
    pub fn can_place_order(
        &self,
        request: &NewOrderRequest,
        products: &HashMap<ProductId, Product>,
        today: NaiveDate,
    ) -> PlacementCheck {
        placement::can_place_order(self, request, products, today)
    }

    // ----- payload validators -----------------------------------------------

    /// Field-level validation of a new standard order payload.
    pub fn validate_new_order(
        &self,
        request: &NewOrderRequest,
        today: NaiveDate,
    ) -> Result<(), ValidationError> {
        validators::validate_new_order(self, request, today)
    }

    /// Field-level validation of a new custom order payload.
    pub fn validate_new_custom_order(
        &self,
        request: &NewCustomOrderRequest,
        today: NaiveDate,
    ) -> Result<(), ValidationError> {
        validators::validate_new_custom_order(self, request, today)
    }

    /// Field-level validation of a product snapshot.
    pub fn validate_product(&self, product: &Product) -> Result<(), ValidationError> {
        validators::validate_product(product)
    }

    /// Field-level validation of a staff-side custom order update.
    pub fn validate_custom_order_update(
        &self,
        update: &CustomOrderUpdate,
    ) -> Result<(), ValidationError> {
        validators::validate_custom_order_update(update)
    }
}
