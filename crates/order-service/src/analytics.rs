//! Read-only analytics projections.
//!
//! Straightforward queries over persisted data: no state mutation, no
//! invariants. Everything here is derived on demand from the repository.

use chrono::NaiveDate;
use common::Money;
use domain::{CustomOrderStatus, OrderStatus};
use serde::Serialize;

use crate::{OrderRepository, StorageError};

/// Order counts per lifecycle status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    pub pending: usize,
    pub confirmed: usize,
    pub preparing: usize,
    pub ready: usize,
    pub delivered: usize,
    pub cancelled: usize,
}

/// Aggregates over standard orders placed in a date range (inclusive).
#[derive(Debug, Clone, Serialize)]
pub struct SalesSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total_orders: usize,
    pub by_status: StatusBreakdown,
    /// Revenue counts delivered orders only.
    pub revenue: Money,
    pub average_order_value: Money,
}

/// One order in a customer's history.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDigest {
    pub order_id: String,
    pub status: OrderStatus,
    pub total: Money,
    pub delivery_date: NaiveDate,
}

/// Everything a customer has ordered, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerHistory {
    pub email: String,
    pub order_count: usize,
    /// Total across non-cancelled orders.
    pub total_spent: Money,
    pub orders: Vec<OrderDigest>,
}

/// A product flagged by the stock report.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDigest {
    pub product_id: String,
    pub name: String,
    pub stock_quantity: i64,
    pub sold_count: i64,
}

/// Cross-cutting view over orders and stock.
#[derive(Debug, Clone, Serialize)]
pub struct BusinessInsights {
    pub standard_orders: usize,
    pub custom_orders: usize,
    pub open_custom_orders: usize,
    pub top_sellers: Vec<ProductDigest>,
    pub low_stock: Vec<ProductDigest>,
}

pub(crate) async fn sales_summary(
    repo: &dyn OrderRepository,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<SalesSummary, StorageError> {
    let orders = repo.list_orders().await?;
    let mut by_status = StatusBreakdown::default();
    let mut revenue = Money::zero();
    let mut total_orders = 0;

    for order in orders {
        let placed = order.created_at.date_naive();
        if placed < from || placed > to {
            continue;
        }
        total_orders += 1;
        match order.status {
            OrderStatus::Pending => by_status.pending += 1,
            OrderStatus::Confirmed => by_status.confirmed += 1,
            OrderStatus::Preparing => by_status.preparing += 1,
            OrderStatus::Ready => by_status.ready += 1,
            OrderStatus::Delivered => by_status.delivered += 1,
            OrderStatus::Cancelled => by_status.cancelled += 1,
        }
        if order.status == OrderStatus::Delivered {
            revenue += order.pricing.total;
        }
    }

    let average_order_value = if by_status.delivered > 0 {
        Money::from_rupees(revenue.rupees() / by_status.delivered as i64)
    } else {
        Money::zero()
    };

    Ok(SalesSummary {
        from,
        to,
        total_orders,
        by_status,
        revenue,
        average_order_value,
    })
}

pub(crate) async fn customer_history(
    repo: &dyn OrderRepository,
    email: &str,
) -> Result<CustomerHistory, StorageError> {
    let mut matching: Vec<_> = repo
        .list_orders()
        .await?
        .into_iter()
        .filter(|o| o.customer.email.eq_ignore_ascii_case(email))
        .collect();
    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let total_spent = matching
        .iter()
        .filter(|o| o.status != OrderStatus::Cancelled)
        .map(|o| o.pricing.total)
        .sum();

    Ok(CustomerHistory {
        email: email.to_string(),
        order_count: matching.len(),
        total_spent,
        orders: matching
            .into_iter()
            .map(|o| OrderDigest {
                order_id: o.order_id.to_string(),
                status: o.status,
                total: o.pricing.total,
                delivery_date: o.delivery_date,
            })
            .collect(),
    })
}

pub(crate) async fn business_insights(
    repo: &dyn OrderRepository,
) -> Result<BusinessInsights, StorageError> {
    let orders = repo.list_orders().await?;
    let customs = repo.list_custom_orders().await?;
    let products = repo.list_products().await?;

    let open_custom_orders = customs
        .iter()
        .filter(|c| {
            matches!(
                c.status,
                CustomOrderStatus::Pending
                    | CustomOrderStatus::Confirmed
                    | CustomOrderStatus::InProgress
            )
        })
        .count();

    let mut top_sellers: Vec<_> = products
        .iter()
        .filter(|p| p.sold_count > 0)
        .map(|p| ProductDigest {
            product_id: p.id.to_string(),
            name: p.name.clone(),
            stock_quantity: p.stock_quantity,
            sold_count: p.sold_count,
        })
        .collect();
    top_sellers.sort_by(|a, b| b.sold_count.cmp(&a.sold_count));
    top_sellers.truncate(5);

    let low_stock = products
        .iter()
        .filter(|p| p.is_active && !p.made_to_order && p.is_low_stock())
        .map(|p| ProductDigest {
            product_id: p.id.to_string(),
            name: p.name.clone(),
            stock_quantity: p.stock_quantity,
            sold_count: p.sold_count,
        })
        .collect();

    Ok(BusinessInsights {
        standard_orders: orders.len(),
        custom_orders: customs.len(),
        open_custom_orders,
        top_sellers,
        low_stock,
    })
}
