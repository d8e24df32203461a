//! In-memory repository for tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{OrderId, OrderKind, ProductId};
use domain::{CustomOrder, Order, Product};
use tokio::sync::RwLock;
use workflow::StockAdjustment;

use crate::{OrderRepository, StorageError};

#[derive(Default)]
struct State {
    orders: HashMap<OrderId, Order>,
    custom_orders: HashMap<OrderId, CustomOrder>,
    products: HashMap<ProductId, Product>,
    fail_adjust_after: Option<usize>,
    fail_on_save: bool,
    fail_on_sequence: bool,
}

/// In-memory repository implementation for testing.
///
/// Provides the same interface as the PostgreSQL implementation, plus
/// failure-injection knobs for exercising compensation paths.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository seeded with products.
    pub async fn with_products(products: Vec<Product>) -> Self {
        let repo = Self::new();
        {
            let mut state = repo.state.write().await;
            for product in products {
                state.products.insert(product.id.clone(), product);
            }
        }
        repo
    }

    /// Fails one stock adjustment after the next `n` succeed, then clears
    /// itself so compensation paths can run.
    pub async fn set_fail_adjust_after(&self, n: usize) {
        self.state.write().await.fail_adjust_after = Some(n);
    }

    /// Clears the stock-adjustment failure injection.
    pub async fn clear_fail_adjust(&self) {
        self.state.write().await.fail_adjust_after = None;
    }

    /// Configures saves to fail.
    pub async fn set_fail_on_save(&self, fail: bool) {
        self.state.write().await.fail_on_save = fail;
    }

    /// Configures the daily-sequence query to fail, forcing the id
    /// generator onto its timestamp fallback.
    pub async fn set_fail_on_sequence(&self, fail: bool) {
        self.state.write().await.fail_on_sequence = fail;
    }

    /// Returns the number of stored orders of both kinds.
    pub async fn order_count(&self) -> usize {
        let state = self.state.read().await;
        state.orders.len() + state.custom_orders.len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryRepository {
    async fn find_order(&self, id: &OrderId) -> Result<Option<Order>, StorageError> {
        Ok(self.state.read().await.orders.get(id).cloned())
    }

    async fn save_order(&self, order: &Order) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        if state.fail_on_save {
            return Err(StorageError::Unavailable("injected save failure".to_string()));
        }
        state.orders.insert(order.order_id.clone(), order.clone());
        Ok(())
    }

    async fn delete_order(&self, id: &OrderId) -> Result<(), StorageError> {
        self.state.write().await.orders.remove(id);
        Ok(())
    }

    async fn find_custom_order(&self, id: &OrderId) -> Result<Option<CustomOrder>, StorageError> {
        Ok(self.state.read().await.custom_orders.get(id).cloned())
    }

    async fn save_custom_order(&self, order: &CustomOrder) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        if state.fail_on_save {
            return Err(StorageError::Unavailable("injected save failure".to_string()));
        }
        state
            .custom_orders
            .insert(order.order_id.clone(), order.clone());
        Ok(())
    }

    async fn delete_custom_order(&self, id: &OrderId) -> Result<(), StorageError> {
        self.state.write().await.custom_orders.remove(id);
        Ok(())
    }

    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, StorageError> {
        Ok(self.state.read().await.products.get(id).cloned())
    }

    async fn save_product(&self, product: &Product) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        state.products.insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn adjust_stock(
        &self,
        id: &ProductId,
        adjustment: StockAdjustment,
    ) -> Result<Product, StorageError> {
        let mut state = self.state.write().await;

        if let Some(remaining) = state.fail_adjust_after {
            if remaining == 0 {
                state.fail_adjust_after = None;
                return Err(StorageError::Unavailable(
                    "injected stock adjustment failure".to_string(),
                ));
            }
            state.fail_adjust_after = Some(remaining - 1);
        }

        let product = state
            .products
            .get_mut(id)
            .ok_or_else(|| StorageError::Conflict(format!("product {id} not found")))?;
        let quantity = adjustment.quantity() as i64;

        match adjustment {
            StockAdjustment::Reserve(_) => {
                if !product.is_active {
                    return Err(StorageError::Conflict(format!(
                        "product {id} is inactive"
                    )));
                }
                if !product.made_to_order {
                    if product.available() < quantity {
                        return Err(StorageError::Conflict(format!(
                            "insufficient stock for {id}: available {}, requested {quantity}",
                            product.available().max(0)
                        )));
                    }
                    product.reserved += quantity;
                }
            }
            StockAdjustment::Release(_) => {
                if !product.made_to_order {
                    product.reserved = (product.reserved - quantity).max(0);
                }
            }
            StockAdjustment::Commit(_) => {
                if !product.made_to_order {
                    if product.stock_quantity < quantity {
                        return Err(StorageError::Conflict(format!(
                            "insufficient stock for {id}: on hand {}, requested {quantity}",
                            product.stock_quantity.max(0)
                        )));
                    }
                    product.stock_quantity -= quantity;
                    product.reserved = (product.reserved - quantity).max(0);
                }
                product.sold_count += quantity;
            }
            StockAdjustment::Restore(_) => {
                if !product.made_to_order {
                    product.stock_quantity += quantity;
                }
                product.sold_count = (product.sold_count - quantity).max(0);
            }
        }

        Ok(product.clone())
    }

    async fn orders_placed_on(
        &self,
        kind: OrderKind,
        date: NaiveDate,
    ) -> Result<u64, StorageError> {
        let state = self.state.read().await;
        if state.fail_on_sequence {
            return Err(StorageError::Unavailable(
                "injected sequence failure".to_string(),
            ));
        }
        let matches = |id: &OrderId| id.kind() == Some(kind) && id.date() == Some(date);
        let count = state.orders.keys().filter(|id| matches(id)).count()
            + state.custom_orders.keys().filter(|id| matches(id)).count();
        Ok(count as u64)
    }

    async fn order_id_exists(&self, id: &OrderId) -> Result<bool, StorageError> {
        let state = self.state.read().await;
        Ok(state.orders.contains_key(id) || state.custom_orders.contains_key(id))
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StorageError> {
        let state = self.state.read().await;
        let mut orders: Vec<_> = state.orders.values().cloned().collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    async fn list_custom_orders(&self) -> Result<Vec<CustomOrder>, StorageError> {
        let state = self.state.read().await;
        let mut orders: Vec<_> = state.custom_orders.values().cloned().collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    async fn list_products(&self) -> Result<Vec<Product>, StorageError> {
        let state = self.state.read().await;
        let mut products: Vec<_> = state.products.values().cloned().collect();
        products.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Money;

    fn product(id: &str, stock: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("{id} cake"),
            price: Money::from_rupees(4000),
            discount_price: None,
            stock_quantity: stock,
            reserved: 0,
            low_stock_threshold: 2,
            sold_count: 0,
            is_active: true,
            made_to_order: false,
        }
    }

    #[tokio::test]
    async fn test_reserve_commit_cycle() {
        let repo = InMemoryRepository::with_products(vec![product("CAKE-CHOC-1KG", 5)]).await;
        let id = ProductId::new("CAKE-CHOC-1KG");

        let p = repo
            .adjust_stock(&id, StockAdjustment::Reserve(2))
            .await
            .unwrap();
        assert_eq!(p.reserved, 2);
        assert_eq!(p.stock_quantity, 5);

        let p = repo
            .adjust_stock(&id, StockAdjustment::Commit(2))
            .await
            .unwrap();
        assert_eq!(p.reserved, 0);
        assert_eq!(p.stock_quantity, 3);
        assert_eq!(p.sold_count, 2);
    }

    #[tokio::test]
    async fn test_reserve_fails_when_holds_exhaust_stock() {
        let repo = InMemoryRepository::with_products(vec![product("CAKE-CHOC-1KG", 3)]).await;
        let id = ProductId::new("CAKE-CHOC-1KG");

        repo.adjust_stock(&id, StockAdjustment::Reserve(3))
            .await
            .unwrap();
        let err = repo
            .adjust_stock(&id, StockAdjustment::Reserve(1))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_release_and_restore() {
        let repo = InMemoryRepository::with_products(vec![product("CAKE-CHOC-1KG", 5)]).await;
        let id = ProductId::new("CAKE-CHOC-1KG");

        repo.adjust_stock(&id, StockAdjustment::Reserve(2))
            .await
            .unwrap();
        let p = repo
            .adjust_stock(&id, StockAdjustment::Release(2))
            .await
            .unwrap();
        assert_eq!(p.reserved, 0);
        assert_eq!(p.stock_quantity, 5);

        repo.adjust_stock(&id, StockAdjustment::Reserve(2))
            .await
            .unwrap();
        repo.adjust_stock(&id, StockAdjustment::Commit(2))
            .await
            .unwrap();
        let p = repo
            .adjust_stock(&id, StockAdjustment::Restore(2))
            .await
            .unwrap();
        assert_eq!(p.stock_quantity, 5);
        assert_eq!(p.sold_count, 0);
    }

    #[tokio::test]
    async fn test_made_to_order_skips_stock_math() {
        let mut p = product("CAKE-CUSTOM", 0);
        p.made_to_order = true;
        let repo = InMemoryRepository::with_products(vec![p]).await;
        let id = ProductId::new("CAKE-CUSTOM");

        repo.adjust_stock(&id, StockAdjustment::Reserve(10))
            .await
            .unwrap();
        let p = repo
            .adjust_stock(&id, StockAdjustment::Commit(10))
            .await
            .unwrap();
        assert_eq!(p.stock_quantity, 0);
        assert_eq!(p.reserved, 0);
        assert_eq!(p.sold_count, 10);
    }

    #[tokio::test]
    async fn test_failure_injection_counts_down() {
        let repo = InMemoryRepository::with_products(vec![
            product("CAKE-A", 5),
            product("CAKE-B", 5),
        ])
        .await;
        repo.set_fail_adjust_after(1).await;

        repo.adjust_stock(&ProductId::new("CAKE-A"), StockAdjustment::Reserve(1))
            .await
            .unwrap();
        let err = repo
            .adjust_stock(&ProductId::new("CAKE-B"), StockAdjustment::Reserve(1))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }
}
