//! Payload validators.
//!
//! Schema-shaped field validation for the input payloads callers submit.
//! Each validator fails on the first bad field with a field-specific message;
//! deeper business legality (stock, placement) is the rules' own job.

use chrono::NaiveDate;
use domain::{CustomOrderUpdate, NewCustomOrderRequest, NewOrderRequest, Product};
use thiserror::Error;

use crate::{Rules, customer};

const MAX_ITEM_QUANTITY: u32 = 50;
const MAX_NOTES_LEN: usize = 500;
const MAX_REQUIREMENTS_LEN: usize = 1000;
const MAX_LABEL_LEN: usize = 50;

/// A malformed or out-of-range input field.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub(crate) fn validate_new_order(
    rules: &Rules,
    request: &NewOrderRequest,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    customer::check_name(&request.customer.name)
        .map_err(|e| ValidationError::new("customer.name", e.to_string()))?;
    customer::check_email(&request.customer.email)
        .map_err(|e| ValidationError::new("customer.email", e.to_string()))?;
    customer::check_phone(&request.customer.phone)
        .map_err(|e| ValidationError::new("customer.phone", e.to_string()))?;
    customer::check_address(&request.customer.address)
        .map_err(|e| ValidationError::new("customer.address", e.to_string()))?;

    if request.items.is_empty() {
        return Err(ValidationError::new(
            "items",
            "at least one item is required",
        ));
    }
    for item in &request.items {
        if item.product_id.as_str().trim().is_empty() {
            return Err(ValidationError::new("items", "product id must not be empty"));
        }
        if item.quantity == 0 || item.quantity > MAX_ITEM_QUANTITY {
            return Err(ValidationError::new(
                "items",
                format!(
                    "quantity for {} must be between 1 and {MAX_ITEM_QUANTITY}",
                    item.product_id
                ),
            ));
        }
    }

    rules
        .check_retail_notice(request.delivery_date, today)
        .map_err(|e| ValidationError::new("delivery_date", e.to_string()))?;

    if request.notes.chars().count() > MAX_NOTES_LEN {
        return Err(ValidationError::new(
            "notes",
            format!("notes cannot exceed {MAX_NOTES_LEN} characters"),
        ));
    }

    Ok(())
}

pub(crate) fn validate_new_custom_order(
    rules: &Rules,
    request: &NewCustomOrderRequest,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    customer::check_name(&request.customer_name)
        .map_err(|e| ValidationError::new("customer_name", e.to_string()))?;
    customer::check_email(&request.customer_email)
        .map_err(|e| ValidationError::new("customer_email", e.to_string()))?;
    customer::check_phone(&request.customer_phone)
        .map_err(|e| ValidationError::new("customer_phone", e.to_string()))?;

    if request.event_type.trim().is_empty() {
        return Err(ValidationError::new("event_type", "event type is required"));
    }
    if request.event_type.chars().count() > MAX_LABEL_LEN {
        return Err(ValidationError::new(
            "event_type",
            format!("event type cannot exceed {MAX_LABEL_LEN} characters"),
        ));
    }
    if request.flavor.chars().count() > MAX_LABEL_LEN {
        return Err(ValidationError::new(
            "flavor",
            format!("flavor cannot exceed {MAX_LABEL_LEN} characters"),
        ));
    }
    if request.requirements.chars().count() > MAX_REQUIREMENTS_LEN {
        return Err(ValidationError::new(
            "requirements",
            format!("requirements cannot exceed {MAX_REQUIREMENTS_LEN} characters"),
        ));
    }

    rules
        .check_custom_window(request.delivery_date, today)
        .map_err(|e| ValidationError::new("delivery_date", e.to_string()))?;

    Ok(())
}

pub(crate) fn validate_product(product: &Product) -> Result<(), ValidationError> {
    if product.name.trim().is_empty() {
        return Err(ValidationError::new("name", "product name is required"));
    }
    if !product.price.is_positive() {
        return Err(ValidationError::new("price", "price must be positive"));
    }
    if let Some(discount) = product.discount_price {
        if !discount.is_positive() {
            return Err(ValidationError::new(
                "discount_price",
                "discount price must be positive",
            ));
        }
        if discount >= product.price {
            return Err(ValidationError::new(
                "discount_price",
                "discount price must be below the regular price",
            ));
        }
    }
    if product.low_stock_threshold < 0 || product.stock_quantity < 0 {
        return Err(ValidationError::new(
            "stock_quantity",
            "stock counters cannot be negative",
        ));
    }
    Ok(())
}

pub(crate) fn validate_custom_order_update(
    update: &CustomOrderUpdate,
) -> Result<(), ValidationError> {
    if let Some(price) = update.estimated_price
        && !price.is_positive()
    {
        return Err(ValidationError::new(
            "estimated_price",
            "estimated price must be positive",
        ));
    }
    if let Some(advance) = update.advance_amount
        && !advance.is_positive()
    {
        return Err(ValidationError::new(
            "advance_amount",
            "advance amount must be positive",
        ));
    }
    if let Some(notes) = &update.admin_notes
        && notes.chars().count() > MAX_NOTES_LEN
    {
        return Err(ValidationError::new(
            "admin_notes",
            format!("notes cannot exceed {MAX_NOTES_LEN} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Money, ProductId};
    use domain::{Address, CakeSize, CustomerInfo, ItemRequest};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    fn order_request() -> NewOrderRequest {
        NewOrderRequest {
            customer: CustomerInfo {
                name: "Nimal Perera".to_string(),
                email: "nimal@example.com".to_string(),
                phone: "0771234567".to_string(),
                address: Address::Freeform("12 Galle Road, Colombo 03".to_string()),
            },
            items: vec![ItemRequest::new("CAKE-CHOC-1KG", 1)],
            delivery_date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
            delivery: Default::default(),
            payment_method: Default::default(),
            notes: String::new(),
        }
    }

    fn custom_request() -> NewCustomOrderRequest {
        NewCustomOrderRequest {
            customer_name: "Kumari Silva".to_string(),
            customer_email: "kumari@example.com".to_string(),
            customer_phone: "+94712345678".to_string(),
            event_type: "Wedding".to_string(),
            cake_size: CakeSize::MultiTier,
            flavor: "Vanilla".to_string(),
            requirements: "Three tiers".to_string(),
            delivery_date: NaiveDate::from_ymd_opt(2026, 9, 20).unwrap(),
            customer_notes: String::new(),
        }
    }

    #[test]
    fn test_valid_order_request_passes() {
        let rules = Rules::default();
        assert!(validate_new_order(&rules, &order_request(), today()).is_ok());
    }

    #[test]
    fn test_field_is_named_in_error() {
        let rules = Rules::default();
        let mut request = order_request();
        request.customer.email = "nope".to_string();
        let err = validate_new_order(&rules, &request, today()).unwrap_err();
        assert_eq!(err.field, "customer.email");
    }

    #[test]
    fn test_quantity_bounds() {
        let rules = Rules::default();
        let mut request = order_request();
        request.items[0].quantity = 51;
        let err = validate_new_order(&rules, &request, today()).unwrap_err();
        assert_eq!(err.field, "items");
    }

    #[test]
    fn test_delivery_date_notice_is_cross_checked() {
        let rules = Rules::default();
        let mut request = order_request();
        request.delivery_date = today();
        let err = validate_new_order(&rules, &request, today()).unwrap_err();
        assert_eq!(err.field, "delivery_date");
    }

    #[test]
    fn test_valid_custom_request_passes() {
        let rules = Rules::default();
        assert!(validate_new_custom_order(&rules, &custom_request(), today()).is_ok());
    }

    #[test]
    fn test_custom_request_needs_seven_days() {
        let rules = Rules::default();
        let mut request = custom_request();
        request.delivery_date = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();
        let err = validate_new_custom_order(&rules, &request, today()).unwrap_err();
        assert_eq!(err.field, "delivery_date");
    }

    #[test]
    fn test_custom_request_six_month_cap() {
        let rules = Rules::default();
        let mut request = custom_request();
        request.delivery_date = NaiveDate::from_ymd_opt(2027, 3, 1).unwrap();
        let err = validate_new_custom_order(&rules, &request, today()).unwrap_err();
        assert_eq!(err.field, "delivery_date");
    }

    #[test]
    fn test_product_discount_must_undercut_price() {
        let product = Product {
            id: ProductId::new("CAKE-CHOC-1KG"),
            name: "Chocolate Cake 1kg".to_string(),
            price: Money::from_rupees(4500),
            discount_price: Some(Money::from_rupees(4500)),
            stock_quantity: 5,
            reserved: 0,
            low_stock_threshold: 2,
            sold_count: 0,
            is_active: true,
            made_to_order: false,
        };
        let err = validate_product(&product).unwrap_err();
        assert_eq!(err.field, "discount_price");
    }

    #[test]
    fn test_update_rejects_non_positive_amounts() {
        let update = CustomOrderUpdate {
            advance_amount: Some(Money::zero()),
            ..Default::default()
        };
        let err = validate_custom_order_update(&update).unwrap_err();
        assert_eq!(err.field, "advance_amount");
    }
}
