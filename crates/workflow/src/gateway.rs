//! Side-effect collaborator traits.
//!
//! Entry actions reach inventory and the payment gateway through these
//! traits; the order service wires in implementations backed by the
//! persistence layer. The workflow itself holds no locks — atomicity of each
//! adjustment is the implementation's responsibility.

use async_trait::async_trait;
use common::{OrderId, ProductId};
use domain::Product;

use crate::SideEffectError;

/// An atomic stock adjustment on a single product.
///
/// Reservations hold units for a pending order without touching on-hand
/// stock; a commit converts the hold into a real decrement and a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAdjustment {
    /// Hold units for a pending order. Fails when availability
    /// (`stock_quantity - reserved`) is insufficient.
    Reserve(u32),
    /// Drop a hold without touching on-hand stock.
    Release(u32),
    /// Convert a hold into a decrement and a `sold_count` increment.
    /// Fails when on-hand stock is insufficient.
    Commit(u32),
    /// Return previously committed units to stock, backing out the sale.
    Restore(u32),
}

impl StockAdjustment {
    /// The number of units the adjustment moves.
    pub fn quantity(&self) -> u32 {
        match self {
            StockAdjustment::Reserve(q)
            | StockAdjustment::Release(q)
            | StockAdjustment::Commit(q)
            | StockAdjustment::Restore(q) => *q,
        }
    }
}

/// Inventory access for entry actions and re-checks.
#[async_trait]
pub trait InventoryGateway: Send + Sync {
    /// Fetches the current snapshot of a product.
    async fn product(&self, id: &ProductId) -> Result<Option<Product>, SideEffectError>;

    /// Applies one atomic adjustment and returns the resulting snapshot.
    async fn apply(
        &self,
        id: &ProductId,
        adjustment: StockAdjustment,
    ) -> Result<Product, SideEffectError>;
}

/// Opaque payment gateway, consulted only to learn whether a payment has
/// been initiated for an order.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn payment_initiated(&self, order_id: &OrderId) -> Result<bool, SideEffectError>;
}
