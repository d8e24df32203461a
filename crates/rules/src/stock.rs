//! Stock availability rules.

use domain::Product;

use crate::RuleError;

/// Availability at placement time: on-hand minus existing holds.
///
/// Made-to-order products bypass the quantity check entirely; inactive
/// products always fail.
pub(crate) fn check_available(product: &Product, requested: u32) -> Result<(), RuleError> {
    if !product.is_active {
        return Err(RuleError::ProductInactive {
            name: product.name.clone(),
        });
    }
    if product.made_to_order {
        return Ok(());
    }
    let available = product.available();
    if available < requested as i64 {
        return Err(RuleError::InsufficientStock {
            name: product.name.clone(),
            requested,
            available: available.max(0),
        });
    }
    Ok(())
}

/// On-hand re-check at confirmation time.
///
/// The confirming order already holds its reservation, so this checks raw
/// `stock_quantity` rather than availability.
pub(crate) fn check_on_hand(product: &Product, requested: u32) -> Result<(), RuleError> {
    if !product.is_active {
        return Err(RuleError::ProductInactive {
            name: product.name.clone(),
        });
    }
    if product.made_to_order {
        return Ok(());
    }
    if product.stock_quantity < requested as i64 {
        return Err(RuleError::InsufficientStock {
            name: product.name.clone(),
            requested,
            available: product.stock_quantity.max(0),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Money, ProductId};

    fn product(stock: i64, reserved: i64) -> Product {
        Product {
            id: ProductId::new("CAKE-CHOC-1KG"),
            name: "Chocolate Cake 1kg".to_string(),
            price: Money::from_rupees(4500),
            discount_price: None,
            stock_quantity: stock,
            reserved,
            low_stock_threshold: 3,
            sold_count: 0,
            is_active: true,
            made_to_order: false,
        }
    }

    #[test]
    fn test_available_stock_passes() {
        assert!(check_available(&product(10, 0), 10).is_ok());
    }

    #[test]
    fn test_holds_reduce_availability() {
        let p = product(10, 8);
        assert!(check_available(&p, 2).is_ok());
        assert!(matches!(
            check_available(&p, 3),
            Err(RuleError::InsufficientStock { available: 2, .. })
        ));
    }

    #[test]
    fn test_inactive_product_always_fails() {
        let mut p = product(10, 0);
        p.is_active = false;
        assert!(matches!(
            check_available(&p, 1),
            Err(RuleError::ProductInactive { .. })
        ));
        // Inactive wins even for made-to-order items.
        p.made_to_order = true;
        assert!(check_available(&p, 1).is_err());
    }

    #[test]
    fn test_made_to_order_bypasses_quantities() {
        let mut p = product(0, 0);
        p.made_to_order = true;
        assert!(check_available(&p, 25).is_ok());
        assert!(check_on_hand(&p, 25).is_ok());
    }

    #[test]
    fn test_on_hand_ignores_reservations() {
        // The confirming order's own hold must not count against it.
        let p = product(2, 2);
        assert!(check_available(&p, 1).is_err());
        assert!(check_on_hand(&p, 2).is_ok());
    }
}
