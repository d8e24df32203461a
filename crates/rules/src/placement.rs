//! Order placement legality.

use std::collections::HashMap;

use chrono::NaiveDate;
use common::ProductId;
use domain::{NewOrderRequest, Product};

use crate::Rules;

/// Structured result of the placement check: every violated rule translated
/// into a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementCheck {
    pub can_place: bool,
    pub errors: Vec<String>,
}

impl PlacementCheck {
    fn ok() -> Self {
        Self {
            can_place: true,
            errors: Vec::new(),
        }
    }

    fn record(&mut self, message: String) {
        self.can_place = false;
        self.errors.push(message);
    }
}

pub(crate) fn can_place_order(
    rules: &Rules,
    request: &NewOrderRequest,
    products: &HashMap<ProductId, Product>,
    today: NaiveDate,
) -> PlacementCheck {
    let mut check = PlacementCheck::ok();

    if let Err(e) = rules.check_retail_notice(request.delivery_date, today) {
        check.record(e.to_string());
    }

    if let Err(e) = rules.check_customer_info(&request.customer) {
        check.record(e.to_string());
    }

    if request.items.is_empty() {
        check.record("order must contain at least one item".to_string());
    }

    for item in &request.items {
        if item.quantity == 0 {
            check.record(format!("quantity for {} must be positive", item.product_id));
            continue;
        }
        // Stock-check items whose product snapshot is already in hand; the
        // remainder are resolved and re-checked by the order service.
        if let Some(product) = products.get(&item.product_id)
            && let Err(e) = rules.check_stock(product, item.quantity)
        {
            check.record(e.to_string());
        }
    }

    check
}
