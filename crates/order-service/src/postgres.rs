//! PostgreSQL-backed repository.
//!
//! Aggregates are stored as JSONB payloads keyed by their public id; product
//! stock counters are columns so every adjustment is a single guarded
//! `UPDATE` — atomic and serializable without application-level locking.

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{Money, OrderId, OrderKind, ProductId};
use domain::{CustomOrder, Order, Product};
use sqlx::{PgPool, Row, postgres::PgRow};
use workflow::StockAdjustment;

use crate::{OrderRepository, StorageError};

/// PostgreSQL repository implementation.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new PostgreSQL repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_product(row: PgRow) -> Result<Product, StorageError> {
        Ok(Product {
            id: ProductId::new(row.try_get::<String, _>("id")?),
            name: row.try_get("name")?,
            price: Money::from_rupees(row.try_get("price")?),
            discount_price: row
                .try_get::<Option<i64>, _>("discount_price")?
                .map(Money::from_rupees),
            stock_quantity: row.try_get("stock_quantity")?,
            reserved: row.try_get("reserved")?,
            low_stock_threshold: row.try_get("low_stock_threshold")?,
            sold_count: row.try_get("sold_count")?,
            is_active: row.try_get("is_active")?,
            made_to_order: row.try_get("made_to_order")?,
        })
    }

    async fn save_payload(
        &self,
        id: &OrderId,
        kind: OrderKind,
        placed_on: NaiveDate,
        payload: serde_json::Value,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, kind, placed_on, payload)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET payload = EXCLUDED.payload
            "#,
        )
        .bind(id.as_str())
        .bind(kind.code())
        .bind(placed_on)
        .bind(payload)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_payload(
        &self,
        id: &OrderId,
        kind: OrderKind,
    ) -> Result<Option<serde_json::Value>, StorageError> {
        let row = sqlx::query("SELECT payload FROM orders WHERE id = $1 AND kind = $2")
            .bind(id.as_str())
            .bind(kind.code())
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| r.try_get("payload").map_err(StorageError::from))
            .transpose()
    }

    async fn delete_payload(&self, id: &OrderId, kind: OrderKind) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM orders WHERE id = $1 AND kind = $2")
            .bind(id.as_str())
            .bind(kind.code())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_payloads(&self, kind: OrderKind) -> Result<Vec<serde_json::Value>, StorageError> {
        let rows = sqlx::query("SELECT payload FROM orders WHERE kind = $1 ORDER BY created_at")
            .bind(kind.code())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|r| r.try_get("payload").map_err(StorageError::from))
            .collect()
    }
}

const PRODUCT_COLUMNS: &str = "id, name, price, discount_price, stock_quantity, reserved, \
                               low_stock_threshold, sold_count, is_active, made_to_order";

#[async_trait]
impl OrderRepository for PostgresRepository {
    async fn find_order(&self, id: &OrderId) -> Result<Option<Order>, StorageError> {
        self.find_payload(id, OrderKind::Retail)
            .await?
            .map(|p| serde_json::from_value(p).map_err(StorageError::from))
            .transpose()
    }

    async fn save_order(&self, order: &Order) -> Result<(), StorageError> {
        let placed_on = order
            .order_id
            .date()
            .unwrap_or_else(|| order.created_at.date_naive());
        self.save_payload(
            &order.order_id,
            OrderKind::Retail,
            placed_on,
            serde_json::to_value(order)?,
        )
        .await
    }

    async fn delete_order(&self, id: &OrderId) -> Result<(), StorageError> {
        self.delete_payload(id, OrderKind::Retail).await
    }

    async fn find_custom_order(&self, id: &OrderId) -> Result<Option<CustomOrder>, StorageError> {
        self.find_payload(id, OrderKind::Custom)
            .await?
            .map(|p| serde_json::from_value(p).map_err(StorageError::from))
            .transpose()
    }

    async fn save_custom_order(&self, order: &CustomOrder) -> Result<(), StorageError> {
        let placed_on = order
            .order_id
            .date()
            .unwrap_or_else(|| order.created_at.date_naive());
        self.save_payload(
            &order.order_id,
            OrderKind::Custom,
            placed_on,
            serde_json::to_value(order)?,
        )
        .await
    }

    async fn delete_custom_order(&self, id: &OrderId) -> Result<(), StorageError> {
        self.delete_payload(id, OrderKind::Custom).await
    }

    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_product).transpose()
    }

    async fn save_product(&self, product: &Product) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, price, discount_price, stock_quantity, reserved,
                                  low_stock_threshold, sold_count, is_active, made_to_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                price = EXCLUDED.price,
                discount_price = EXCLUDED.discount_price,
                stock_quantity = EXCLUDED.stock_quantity,
                reserved = EXCLUDED.reserved,
                low_stock_threshold = EXCLUDED.low_stock_threshold,
                sold_count = EXCLUDED.sold_count,
                is_active = EXCLUDED.is_active,
                made_to_order = EXCLUDED.made_to_order
            "#,
        )
        .bind(product.id.as_str())
        .bind(&product.name)
        .bind(product.price.rupees())
        .bind(product.discount_price.map(|m| m.rupees()))
        .bind(product.stock_quantity)
        .bind(product.reserved)
        .bind(product.low_stock_threshold)
        .bind(product.sold_count)
        .bind(product.is_active)
        .bind(product.made_to_order)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn adjust_stock(
        &self,
        id: &ProductId,
        adjustment: StockAdjustment,
    ) -> Result<Product, StorageError> {
        let quantity = adjustment.quantity() as i64;

        // Each arm is one guarded UPDATE: the WHERE clause is the
        // adjustment's precondition, so concurrent adjustments serialize on
        // the row without lost updates.
        let sql = match adjustment {
            StockAdjustment::Reserve(_) => format!(
                r#"
                UPDATE products SET
                    reserved = CASE WHEN made_to_order THEN reserved ELSE reserved + $2 END
                WHERE id = $1
                  AND is_active
                  AND (made_to_order OR stock_quantity - reserved >= $2)
                RETURNING {PRODUCT_COLUMNS}
                "#
            ),
            StockAdjustment::Release(_) => format!(
                r#"
                UPDATE products SET
                    reserved = CASE WHEN made_to_order THEN reserved
                               ELSE GREATEST(reserved - $2, 0) END
                WHERE id = $1
                RETURNING {PRODUCT_COLUMNS}
                "#
            ),
            StockAdjustment::Commit(_) => format!(
                r#"
                UPDATE products SET
                    stock_quantity = CASE WHEN made_to_order THEN stock_quantity
                                     ELSE stock_quantity - $2 END,
                    reserved = CASE WHEN made_to_order THEN reserved
                               ELSE GREATEST(reserved - $2, 0) END,
                    sold_count = sold_count + $2
                WHERE id = $1
                  AND (made_to_order OR stock_quantity >= $2)
                RETURNING {PRODUCT_COLUMNS}
                "#
            ),
            StockAdjustment::Restore(_) => format!(
                r#"
                UPDATE products SET
                    stock_quantity = CASE WHEN made_to_order THEN stock_quantity
                                     ELSE stock_quantity + $2 END,
                    sold_count = GREATEST(sold_count - $2, 0)
                WHERE id = $1
                RETURNING {PRODUCT_COLUMNS}
                "#
            ),
        };

        let row = sqlx::query(&sql)
            .bind(id.as_str())
            .bind(quantity)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Self::row_to_product(row),
            None => {
                // Guard failed or the product does not exist; tell the two
                // apart for the error message.
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                        .bind(id.as_str())
                        .fetch_one(&self.pool)
                        .await?;
                if exists {
                    Err(StorageError::Conflict(format!(
                        "stock adjustment rejected for {id}: insufficient stock or inactive"
                    )))
                } else {
                    Err(StorageError::Conflict(format!("product {id} not found")))
                }
            }
        }
    }

    async fn orders_placed_on(
        &self,
        kind: OrderKind,
        date: NaiveDate,
    ) -> Result<u64, StorageError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE kind = $1 AND placed_on = $2")
                .bind(kind.code())
                .bind(date)
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }

    async fn order_id_exists(&self, id: &OrderId) -> Result<bool, StorageError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE id = $1)")
            .bind(id.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StorageError> {
        self.list_payloads(OrderKind::Retail)
            .await?
            .into_iter()
            .map(|p| serde_json::from_value(p).map_err(StorageError::from))
            .collect()
    }

    async fn list_custom_orders(&self) -> Result<Vec<CustomOrder>, StorageError> {
        self.list_payloads(OrderKind::Custom)
            .await?
            .into_iter()
            .map(|p| serde_json::from_value(p).map_err(StorageError::from))
            .collect()
    }

    async fn list_products(&self) -> Result<Vec<Product>, StorageError> {
        let rows = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_product).collect()
    }
}
