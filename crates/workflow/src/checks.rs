//! Pre-entry validations.
//!
//! Each target state carries a fixed list of checks, run in order before the
//! status field changes; the first failure aborts the transition with no
//! partial state change. Checks are tagged variants dispatched by pattern
//! match in the manager.

use domain::{CustomOrderStatus, OrderStatus};

/// Checks run before an order enters a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEntryCheck {
    /// On-hand stock still covers every line item.
    StockAvailable,
    /// The delivery date still satisfies the advance-notice rule.
    DeliveryNotice,
    /// The contact snapshot still passes the customer-info rules.
    CustomerInfo,
    /// Cash on delivery always passes; an online transfer must have an
    /// initiated payment before the order can be confirmed.
    PaymentInitiated,
}

/// Checks run before a custom order enters a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomEntryCheck {
    /// Staff must have quoted an estimated price.
    EstimatedPriceSet,
    /// The delivery date is at least seven days out and within six months.
    DeliveryWindow,
    /// A billed advance must be paid before production starts.
    AdvanceSettled,
}

/// The checks guarding entry into each order state.
pub fn order_entry_checks(target: OrderStatus) -> &'static [OrderEntryCheck] {
    use OrderEntryCheck::*;
    match target {
        OrderStatus::Confirmed => &[StockAvailable, DeliveryNotice, CustomerInfo, PaymentInitiated],
        _ => &[],
    }
}

/// The checks guarding entry into each custom order state.
pub fn custom_entry_checks(target: CustomOrderStatus) -> &'static [CustomEntryCheck] {
    use CustomEntryCheck::*;
    match target {
        CustomOrderStatus::Confirmed => &[EstimatedPriceSet, DeliveryWindow],
        CustomOrderStatus::InProgress => &[AdvanceSettled],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_confirmation_is_guarded_for_orders() {
        assert_eq!(order_entry_checks(OrderStatus::Confirmed).len(), 4);
        assert!(order_entry_checks(OrderStatus::Preparing).is_empty());
        assert!(order_entry_checks(OrderStatus::Ready).is_empty());
        assert!(order_entry_checks(OrderStatus::Delivered).is_empty());
        assert!(order_entry_checks(OrderStatus::Cancelled).is_empty());
    }

    #[test]
    fn test_custom_order_guards() {
        assert_eq!(
            custom_entry_checks(CustomOrderStatus::Confirmed),
            &[
                CustomEntryCheck::EstimatedPriceSet,
                CustomEntryCheck::DeliveryWindow
            ]
        );
        assert_eq!(
            custom_entry_checks(CustomOrderStatus::InProgress),
            &[CustomEntryCheck::AdvanceSettled]
        );
        assert!(custom_entry_checks(CustomOrderStatus::Cancelled).is_empty());
    }
}
