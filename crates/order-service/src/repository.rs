//! The persistence contract.

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{OrderId, OrderKind, ProductId};
use domain::{CustomOrder, Order, Product};
use workflow::StockAdjustment;

use crate::StorageError;

/// Persistence collaborator for orders, custom orders and product stock.
///
/// Concurrent updates to the same entity are serialized by the
/// implementation (keyed on the public order id), and every stock adjustment
/// is a single atomic, guarded operation — never an application-level
/// read-modify-write.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_order(&self, id: &OrderId) -> Result<Option<Order>, StorageError>;
    async fn save_order(&self, order: &Order) -> Result<(), StorageError>;
    async fn delete_order(&self, id: &OrderId) -> Result<(), StorageError>;

    async fn find_custom_order(&self, id: &OrderId) -> Result<Option<CustomOrder>, StorageError>;
    async fn save_custom_order(&self, order: &CustomOrder) -> Result<(), StorageError>;
    async fn delete_custom_order(&self, id: &OrderId) -> Result<(), StorageError>;

    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, StorageError>;
    async fn save_product(&self, product: &Product) -> Result<(), StorageError>;

    /// Applies one atomic stock adjustment and returns the resulting
    /// snapshot. Fails with [`StorageError::Conflict`] when the adjustment's
    /// guard does not hold.
    async fn adjust_stock(
        &self,
        id: &ProductId,
        adjustment: StockAdjustment,
    ) -> Result<Product, StorageError>;

    /// Number of orders of the given kind placed on a date, counted across
    /// both order collections. Feeds the daily id sequence.
    async fn orders_placed_on(&self, kind: OrderKind, date: NaiveDate)
    -> Result<u64, StorageError>;

    /// Returns true if any order (of either kind) uses the id.
    async fn order_id_exists(&self, id: &OrderId) -> Result<bool, StorageError>;

    async fn list_orders(&self) -> Result<Vec<Order>, StorageError>;
    async fn list_custom_orders(&self) -> Result<Vec<CustomOrder>, StorageError>;
    async fn list_products(&self) -> Result<Vec<Product>, StorageError>;
}
