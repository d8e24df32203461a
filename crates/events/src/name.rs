//! Event name taxonomy.

use serde::{Deserialize, Serialize};

/// Coarse grouping of event names, used by subscribers that want a whole
/// family (`order*`, `payment*`, ...) without listing each name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Order,
    CustomOrder,
    Payment,
    Stock,
    System,
}

/// Every event name the core emits.
///
/// Wire names are camelCase, matching the source system's event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventName {
    // Standard order lifecycle
    OrderCreated,
    OrderPending,
    OrderConfirmed,
    OrderPreparing,
    OrderReady,
    OrderDelivered,
    OrderCancelled,

    // Custom order lifecycle
    CustomOrderCreated,
    CustomOrderPending,
    CustomOrderConfirmed,
    CustomOrderInProgress,
    CustomOrderCompleted,
    CustomOrderCancelled,
    CustomOrderAdvanceRequested,
    CustomOrderAdvancePaid,
    CustomOrderRefundInitiated,

    // Payment lifecycle
    PaymentPending,
    PaymentPaid,
    PaymentFailed,
    PaymentRefunded,

    // Stock observability
    StockLow,
    StockOut,
    StockRestored,

    // Cross-cutting
    StateTransition,
    BusinessError,
}

impl EventName {
    /// Returns the camelCase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::OrderCreated => "orderCreated",
            EventName::OrderPending => "orderPending",
            EventName::OrderConfirmed => "orderConfirmed",
            EventName::OrderPreparing => "orderPreparing",
            EventName::OrderReady => "orderReady",
            EventName::OrderDelivered => "orderDelivered",
            EventName::OrderCancelled => "orderCancelled",
            EventName::CustomOrderCreated => "customOrderCreated",
            EventName::CustomOrderPending => "customOrderPending",
            EventName::CustomOrderConfirmed => "customOrderConfirmed",
            EventName::CustomOrderInProgress => "customOrderInProgress",
            EventName::CustomOrderCompleted => "customOrderCompleted",
            EventName::CustomOrderCancelled => "customOrderCancelled",
            EventName::CustomOrderAdvanceRequested => "customOrderAdvanceRequested",
            EventName::CustomOrderAdvancePaid => "customOrderAdvancePaid",
            EventName::CustomOrderRefundInitiated => "customOrderRefundInitiated",
            EventName::PaymentPending => "paymentPending",
            EventName::PaymentPaid => "paymentPaid",
            EventName::PaymentFailed => "paymentFailed",
            EventName::PaymentRefunded => "paymentRefunded",
            EventName::StockLow => "stockLow",
            EventName::StockOut => "stockOut",
            EventName::StockRestored => "stockRestored",
            EventName::StateTransition => "stateTransition",
            EventName::BusinessError => "businessError",
        }
    }

    /// Returns the category this name belongs to.
    pub fn category(&self) -> EventCategory {
        use EventName::*;
        match self {
            OrderCreated | OrderPending | OrderConfirmed | OrderPreparing | OrderReady
            | OrderDelivered | OrderCancelled => EventCategory::Order,
            CustomOrderCreated | CustomOrderPending | CustomOrderConfirmed
            | CustomOrderInProgress | CustomOrderCompleted | CustomOrderCancelled
            | CustomOrderAdvanceRequested | CustomOrderAdvancePaid | CustomOrderRefundInitiated => {
                EventCategory::CustomOrder
            }
            PaymentPending | PaymentPaid | PaymentFailed | PaymentRefunded => {
                EventCategory::Payment
            }
            StockLow | StockOut | StockRestored => EventCategory::Stock,
            StateTransition | BusinessError => EventCategory::System,
        }
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
