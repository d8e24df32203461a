//! Product snapshot.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

/// Snapshot of a catalogue product as the order core sees it.
///
/// The core reads these and, through the order service, is the exclusive
/// writer of the stock counters. `reserved` tracks units held by pending
/// orders; availability is `stock_quantity - reserved` until a confirmation
/// commits the hold into a real decrement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub discount_price: Option<Money>,
    pub stock_quantity: i64,
    pub reserved: i64,
    pub low_stock_threshold: i64,
    pub sold_count: i64,
    pub is_active: bool,
    /// Made-to-order products bypass stock tracking entirely.
    pub made_to_order: bool,
}

impl Product {
    /// Returns the price a line item pays: the discount price when one is
    /// set below the regular price, the regular price otherwise.
    pub fn effective_price(&self) -> Money {
        match self.discount_price {
            Some(discount) if discount < self.price => discount,
            _ => self.price,
        }
    }

    /// Units available to new orders (on-hand minus holds).
    pub fn available(&self) -> i64 {
        self.stock_quantity - self.reserved
    }

    /// Returns true once on-hand stock reaches the low-stock threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.low_stock_threshold
    }

    /// Returns true when on-hand stock is exhausted.
    pub fn is_out_of_stock(&self) -> bool {
        self.stock_quantity <= 0
    }
}
