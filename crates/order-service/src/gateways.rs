//! Workflow gateway implementations.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{OrderId, ProductId};
use domain::Product;
use workflow::{InventoryGateway, PaymentGateway, SideEffectError, StockAdjustment};

use crate::{OrderRepository, StorageError};

/// Inventory gateway backed by the order repository, handed to the workflow
/// manager so entry actions reach the same atomic stock operations the
/// service uses.
pub struct RepositoryInventory {
    repo: Arc<dyn OrderRepository>,
}

impl RepositoryInventory {
    pub fn new(repo: Arc<dyn OrderRepository>) -> Self {
        Self { repo }
    }
}

fn stock_error(id: &ProductId, error: StorageError) -> SideEffectError {
    match error {
        StorageError::Conflict(message) => SideEffectError::Stock {
            product_id: id.to_string(),
            message,
        },
        other => SideEffectError::Storage(other.to_string()),
    }
}

#[async_trait]
impl InventoryGateway for RepositoryInventory {
    async fn product(&self, id: &ProductId) -> Result<Option<Product>, SideEffectError> {
        self.repo
            .find_product(id)
            .await
            .map_err(|e| SideEffectError::Storage(e.to_string()))
    }

    async fn apply(
        &self,
        id: &ProductId,
        adjustment: StockAdjustment,
    ) -> Result<Product, SideEffectError> {
        self.repo
            .adjust_stock(id, adjustment)
            .await
            .map_err(|e| stock_error(id, e))
    }
}

/// In-memory stand-in for the opaque payment gateway.
///
/// The real gateway lives outside the core; this double only answers the one
/// question the core asks — whether a payment has been initiated.
#[derive(Default)]
pub struct InMemoryPaymentGateway {
    initiated: RwLock<HashSet<OrderId>>,
}

impl InMemoryPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a payment was initiated for the order.
    pub fn mark_initiated(&self, id: &OrderId) {
        self.initiated
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.clone());
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn payment_initiated(&self, order_id: &OrderId) -> Result<bool, SideEffectError> {
        Ok(self
            .initiated
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_payment_gateway_tracks_initiation() {
        let gateway = InMemoryPaymentGateway::new();
        let id = OrderId::new("ORD-PRM-20260807-0001");

        assert!(!gateway.payment_initiated(&id).await.unwrap());
        gateway.mark_initiated(&id);
        assert!(gateway.payment_initiated(&id).await.unwrap());
    }
}
