//! Input payloads handed to the order service.

use chrono::NaiveDate;
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::{AdvanceStatus, CakeSize, CustomerInfo, CustomerTier, PaymentMethod, TimeSlot};

/// One requested line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl ItemRequest {
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// Delivery options affecting the fee calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DeliveryOptions {
    pub time_slot: TimeSlot,
    pub is_express: bool,
    pub customer_tier: CustomerTier,
}

/// Request to place a standard order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderRequest {
    pub customer: CustomerInfo,
    pub items: Vec<ItemRequest>,
    pub delivery_date: NaiveDate,
    #[serde(default)]
    pub delivery: DeliveryOptions,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: String,
}

/// Request to place a custom cake order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomOrderRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub event_type: String,
    pub cake_size: CakeSize,
    #[serde(default)]
    pub flavor: String,
    #[serde(default)]
    pub requirements: String,
    pub delivery_date: NaiveDate,
    #[serde(default)]
    pub customer_notes: String,
}

/// Staff-side fields merged into a custom order before a status update runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CustomOrderUpdate {
    pub estimated_price: Option<Money>,
    pub advance_amount: Option<Money>,
    pub advance_status: Option<AdvanceStatus>,
    pub admin_notes: Option<String>,
}

impl CustomOrderUpdate {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.estimated_price.is_none()
            && self.advance_amount.is_none()
            && self.advance_status.is_none()
            && self.admin_notes.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_options_defaults() {
        let options = DeliveryOptions::default();
        assert_eq!(options.time_slot, TimeSlot::Standard);
        assert!(!options.is_express);
        assert_eq!(options.customer_tier, CustomerTier::Regular);
    }

    #[test]
    fn test_update_is_empty() {
        assert!(CustomOrderUpdate::default().is_empty());
        let update = CustomOrderUpdate {
            estimated_price: Some(Money::from_rupees(12000)),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
