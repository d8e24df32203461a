//! The standard order aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use common::{Money, OrderId, ProductId};
use serde::{Deserialize, Serialize};

use crate::{
    ConsistencyError, CustomerInfo, CustomerTier, OrderStatus, PaymentMethod, PaymentStatus,
    TimeSlot,
};

/// A line item with its price snapshot taken at placement time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub subtotal: Money,
}

impl OrderItem {
    /// Creates a line item, deriving the subtotal.
    pub fn new(
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            unit_price,
            quantity,
            subtotal: unit_price.multiply(quantity),
        }
    }

    /// Checks the `subtotal == price * quantity` invariant.
    pub fn verify(&self) -> Result<(), ConsistencyError> {
        if self.subtotal != self.unit_price.multiply(self.quantity) {
            return Err(ConsistencyError::ItemSubtotal {
                product_id: self.product_id.to_string(),
                unit_price: self.unit_price,
                quantity: self.quantity,
                subtotal: self.subtotal,
            });
        }
        Ok(())
    }
}

/// The pricing block. `total` is always `subtotal + delivery_fee`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

impl Pricing {
    /// Creates a pricing block, deriving the total.
    pub fn new(subtotal: Money, delivery_fee: Money) -> Self {
        Self {
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee,
        }
    }

    /// Checks the `total == subtotal + delivery_fee` invariant.
    pub fn verify(&self) -> Result<(), ConsistencyError> {
        if self.total != self.subtotal + self.delivery_fee {
            return Err(ConsistencyError::TotalMismatch {
                subtotal: self.subtotal,
                delivery_fee: self.delivery_fee,
                total: self.total,
            });
        }
        Ok(())
    }
}

/// Delivery metadata resolved at placement time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    /// City the fee zone was resolved from (empty when unknown).
    pub city: String,
    /// Resolved fee zone code.
    pub zone: Option<String>,
    pub time_slot: TimeSlot,
    pub is_express: bool,
    pub customer_tier: CustomerTier,
}

/// A standard order for catalogue products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub customer: CustomerInfo,
    pub items: Vec<OrderItem>,
    pub pricing: Pricing,
    pub delivery: DeliveryDetails,
    pub delivery_date: NaiveDate,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new order in its initial `pending` state.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        order_id: OrderId,
        customer: CustomerInfo,
        items: Vec<OrderItem>,
        pricing: Pricing,
        delivery: DeliveryDetails,
        delivery_date: NaiveDate,
        payment_method: PaymentMethod,
        notes: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            order_id,
            customer,
            items,
            pricing,
            delivery,
            delivery_date,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method,
            notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks every pricing invariant: item subtotals, their sum, and the
    /// grand total.
    pub fn verify_pricing(&self) -> Result<(), ConsistencyError> {
        for item in &self.items {
            item.verify()?;
        }
        let item_sum: Money = self.items.iter().map(|i| i.subtotal).sum();
        if item_sum != self.pricing.subtotal {
            return Err(ConsistencyError::SubtotalMismatch {
                subtotal: self.pricing.subtotal,
                item_sum,
            });
        }
        self.pricing.verify()
    }

    /// Appends a line to the order's free-text notes.
    pub fn append_note(&mut self, note: &str) {
        if !self.notes.is_empty() {
            self.notes.push('\n');
        }
        self.notes.push_str(note);
    }

    /// Bumps the modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
