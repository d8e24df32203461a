//! Transition engine tests against in-memory collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Days, Utc};
use common::{Money, OrderId, ProductId};
use domain::{
    Address, AdvanceStatus, CakeSize, CustomOrder, CustomOrderStatus, CustomerInfo,
    DeliveryDetails, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, Pricing,
};
use events::{EventBus, EventName};
use rules::{RuleError, Rules};
use workflow::{
    InventoryGateway, PaymentGateway, SideEffectError, StockAdjustment, TransitionContext,
    TransitionOutcome, WorkflowError, WorkflowManager,
};

struct FakeInventory {
    products: Mutex<HashMap<ProductId, domain::Product>>,
}

impl FakeInventory {
    fn with_products(products: Vec<domain::Product>) -> Arc<Self> {
        Arc::new(Self {
            products: Mutex::new(products.into_iter().map(|p| (p.id.clone(), p)).collect()),
        })
    }

    fn snapshot(&self, id: &str) -> domain::Product {
        self.products.lock().unwrap()[&ProductId::new(id)].clone()
    }
}

#[async_trait]
impl InventoryGateway for FakeInventory {
    async fn product(&self, id: &ProductId) -> Result<Option<domain::Product>, SideEffectError> {
        Ok(self.products.lock().unwrap().get(id).cloned())
    }

    async fn apply(
        &self,
        id: &ProductId,
        adjustment: StockAdjustment,
    ) -> Result<domain::Product, SideEffectError> {
        let mut products = self.products.lock().unwrap();
        let product = products.get_mut(id).ok_or_else(|| SideEffectError::Stock {
            product_id: id.to_string(),
            message: "product not found".to_string(),
        })?;
        let quantity = adjustment.quantity() as i64;

        match adjustment {
            StockAdjustment::Reserve(_) => {
                if !product.made_to_order {
                    if product.available() < quantity {
                        return Err(SideEffectError::Stock {
                            product_id: id.to_string(),
                            message: "insufficient stock".to_string(),
                        });
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
                        return Err(SideEffectError::Stock {
                            product_id: id.to_string(),
                            message: "insufficient stock".to_string(),
                        });
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
}

#[derive(Default)]
struct FakePayments {
    initiated: AtomicBool,
}

#[async_trait]
impl PaymentGateway for FakePayments {
    async fn payment_initiated(&self, _order_id: &OrderId) -> Result<bool, SideEffectError> {
        Ok(self.initiated.load(Ordering::SeqCst))
    }
}

fn product(id: &str, stock: i64, reserved: i64, threshold: i64) -> domain::Product {
    domain::Product {
        id: ProductId::new(id),
        name: format!("{id} cake"),
        price: Money::from_rupees(4000),
        discount_price: None,
        stock_quantity: stock,
        reserved,
        low_stock_threshold: threshold,
        sold_count: 0,
        is_active: true,
        made_to_order: false,
    }
}

fn order(items: Vec<OrderItem>, payment_method: PaymentMethod) -> Order {
    let subtotal: Money = items.iter().map(|i| i.subtotal).sum();
    Order::new(
        OrderId::new("ORD-PRM-20260807-0001"),
        CustomerInfo {
            name: "Nimal Perera".to_string(),
            email: "nimal@example.com".to_string(),
            phone: "0771234567".to_string(),
            address: Address::Structured {
                street: "12 Galle Road".to_string(),
                city: "Colombo".to_string(),
                postal_code: None,
            },
        },
        items,
        Pricing::new(subtotal, Money::from_rupees(350)),
        DeliveryDetails {
            city: "Colombo".to_string(),
            zone: Some("colombo".to_string()),
            time_slot: Default::default(),
            is_express: false,
            customer_tier: Default::default(),
        },
        Utc::now()
            .date_naive()
            .checked_add_days(Days::new(5))
            .unwrap(),
        payment_method,
        String::new(),
    )
}

fn custom_order() -> CustomOrder {
    CustomOrder::new(
        OrderId::new("ORD-CUS-20260807-0001"),
        "Kumari Silva".to_string(),
        "kumari@example.com".to_string(),
        "0712345678".to_string(),
        "Wedding".to_string(),
        CakeSize::TwoKg,
        "Vanilla".to_string(),
        "Gold leaf trim".to_string(),
        Utc::now()
            .date_naive()
            .checked_add_days(Days::new(21))
            .unwrap(),
        String::new(),
    )
}

fn setup(products: Vec<domain::Product>) -> (WorkflowManager, Arc<FakeInventory>, Arc<FakePayments>, EventBus) {
    let inventory = FakeInventory::with_products(products);
    let payments = Arc::new(FakePayments::default());
    let bus = EventBus::new();
    let manager = WorkflowManager::new(
        Arc::new(Rules::default()),
        bus.clone(),
        inventory.clone(),
        payments.clone(),
    );
    (manager, inventory, payments, bus)
}

#[tokio::test]
async fn test_full_lifecycle_commits_stock_once() {
    let (manager, inventory, _, bus) = setup(vec![product("CAKE-CHOC-1KG", 10, 2, 3)]);
    let mut order = order(
        vec![OrderItem::new(
            "CAKE-CHOC-1KG",
            "Chocolate Cake 1kg",
            Money::from_rupees(4000),
            2,
        )],
        PaymentMethod::CashOnDelivery,
    );
    let ctx = TransitionContext::new();

    manager
        .transition_order(&mut order, OrderStatus::Confirmed, &ctx)
        .await
        .unwrap();
    let p = inventory.snapshot("CAKE-CHOC-1KG");
    assert_eq!(p.stock_quantity, 8);
    assert_eq!(p.reserved, 0);
    assert_eq!(p.sold_count, 2);

    manager
        .transition_order(&mut order, OrderStatus::Preparing, &ctx)
        .await
        .unwrap();
    manager
        .transition_order(&mut order, OrderStatus::Ready, &ctx)
        .await
        .unwrap();
    manager
        .transition_order(&mut order, OrderStatus::Delivered, &ctx)
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Delivered);
    let p = inventory.snapshot("CAKE-CHOC-1KG");
    assert_eq!(p.stock_quantity, 8);

    assert_eq!(bus.named(EventName::OrderConfirmed).len(), 1);
    assert_eq!(bus.named(EventName::OrderDelivered).len(), 1);
    assert_eq!(bus.named(EventName::StateTransition).len(), 4);
}

#[tokio::test]
async fn test_same_state_transition_is_a_noop() {
    let (manager, inventory, _, _) = setup(vec![product("CAKE-CHOC-1KG", 10, 2, 3)]);
    let mut order = order(
        vec![OrderItem::new(
            "CAKE-CHOC-1KG",
            "Chocolate Cake 1kg",
            Money::from_rupees(4000),
            2,
        )],
        PaymentMethod::CashOnDelivery,
    );
    let ctx = TransitionContext::new();

    // Creating with a pending target when already pending must not re-run
    // entry actions.
    let outcome = manager
        .transition_order(&mut order, OrderStatus::Pending, &ctx)
        .await
        .unwrap();
    assert_eq!(outcome, TransitionOutcome::NoChange);

    manager
        .transition_order(&mut order, OrderStatus::Confirmed, &ctx)
        .await
        .unwrap();
    let outcome = manager
        .transition_order(&mut order, OrderStatus::Confirmed, &ctx)
        .await
        .unwrap();
    assert_eq!(outcome, TransitionOutcome::NoChange);

    // Stock was committed exactly once.
    let p = inventory.snapshot("CAKE-CHOC-1KG");
    assert_eq!(p.stock_quantity, 8);
    assert_eq!(p.sold_count, 2);
}

#[tokio::test]
async fn test_skipping_a_state_is_illegal_and_mutates_nothing() {
    let (manager, inventory, _, _) = setup(vec![product("CAKE-CHOC-1KG", 10, 2, 3)]);
    let mut order = order(
        vec![OrderItem::new(
            "CAKE-CHOC-1KG",
            "Chocolate Cake 1kg",
            Money::from_rupees(4000),
            2,
        )],
        PaymentMethod::CashOnDelivery,
    );
    let ctx = TransitionContext::new();

    manager
        .transition_order(&mut order, OrderStatus::Confirmed, &ctx)
        .await
        .unwrap();
    let stock_before = inventory.snapshot("CAKE-CHOC-1KG");

    // confirmed -> ready skips preparing.
    let err = manager
        .transition_order(&mut order, OrderStatus::Ready, &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::IllegalTransition { .. }));
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(inventory.snapshot("CAKE-CHOC-1KG"), stock_before);
}

#[tokio::test]
async fn test_cancel_from_pending_releases_hold_without_restoring_stock() {
    let (manager, inventory, _, bus) = setup(vec![product("CAKE-CHOC-1KG", 10, 2, 3)]);
    let mut order = order(
        vec![OrderItem::new(
            "CAKE-CHOC-1KG",
            "Chocolate Cake 1kg",
            Money::from_rupees(4000),
            2,
        )],
        PaymentMethod::CashOnDelivery,
    );
    let ctx = TransitionContext::new().with_reason("customer changed mind");

    manager
        .transition_order(&mut order, OrderStatus::Cancelled, &ctx)
        .await
        .unwrap();

    let p = inventory.snapshot("CAKE-CHOC-1KG");
    // On-hand stock never moved; only the hold is dropped.
    assert_eq!(p.stock_quantity, 10);
    assert_eq!(p.reserved, 0);
    assert!(bus.named(EventName::StockRestored).is_empty());
}

#[tokio::test]
async fn test_cancel_from_confirmed_restores_stock() {
    let (manager, inventory, _, bus) = setup(vec![product("CAKE-CHOC-1KG", 10, 2, 3)]);
    let mut order = order(
        vec![OrderItem::new(
            "CAKE-CHOC-1KG",
            "Chocolate Cake 1kg",
            Money::from_rupees(4000),
            2,
        )],
        PaymentMethod::CashOnDelivery,
    );
    let ctx = TransitionContext::new();

    manager
        .transition_order(&mut order, OrderStatus::Confirmed, &ctx)
        .await
        .unwrap();
    assert_eq!(inventory.snapshot("CAKE-CHOC-1KG").stock_quantity, 8);

    manager
        .transition_order(&mut order, OrderStatus::Cancelled, &ctx)
        .await
        .unwrap();

    let p = inventory.snapshot("CAKE-CHOC-1KG");
    assert_eq!(p.stock_quantity, 10);
    assert_eq!(p.sold_count, 0);
    assert_eq!(bus.named(EventName::StockRestored).len(), 1);
}

#[tokio::test]
async fn test_online_transfer_requires_initiated_payment() {
    let (manager, _, payments, _) = setup(vec![product("CAKE-CHOC-1KG", 10, 1, 3)]);
    let mut order = order(
        vec![OrderItem::new(
            "CAKE-CHOC-1KG",
            "Chocolate Cake 1kg",
            Money::from_rupees(4000),
            1,
        )],
        PaymentMethod::OnlineTransfer,
    );
    let ctx = TransitionContext::new();

    let err = manager
        .transition_order(&mut order, OrderStatus::Confirmed, &ctx)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::RuleViolation(RuleError::PaymentNotInitiated)
    ));
    assert_eq!(order.status, OrderStatus::Pending);

    payments.initiated.store(true, Ordering::SeqCst);
    manager
        .transition_order(&mut order, OrderStatus::Confirmed, &ctx)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Confirmed);
}

#[tokio::test]
async fn test_cod_passes_payment_check() {
    let (manager, _, _, _) = setup(vec![product("CAKE-CHOC-1KG", 10, 1, 3)]);
    let mut order = order(
        vec![OrderItem::new(
            "CAKE-CHOC-1KG",
            "Chocolate Cake 1kg",
            Money::from_rupees(4000),
            1,
        )],
        PaymentMethod::CashOnDelivery,
    );
    let ctx = TransitionContext::new();

    manager
        .transition_order(&mut order, OrderStatus::Confirmed, &ctx)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Confirmed);
}

#[tokio::test]
async fn test_confirmation_rechecks_on_hand_stock() {
    let (manager, _, _, _) = setup(vec![product("CAKE-CHOC-1KG", 1, 1, 3)]);
    let mut order = order(
        vec![OrderItem::new(
            "CAKE-CHOC-1KG",
            "Chocolate Cake 1kg",
            Money::from_rupees(4000),
            2,
        )],
        PaymentMethod::CashOnDelivery,
    );
    let ctx = TransitionContext::new();

    let err = manager
        .transition_order(&mut order, OrderStatus::Confirmed, &ctx)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::RuleViolation(RuleError::InsufficientStock { .. })
    ));
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_confirmation_emits_low_stock_signal() {
    let (manager, _, _, bus) = setup(vec![product("CAKE-CHOC-1KG", 4, 2, 3)]);
    let mut order = order(
        vec![OrderItem::new(
            "CAKE-CHOC-1KG",
            "Chocolate Cake 1kg",
            Money::from_rupees(4000),
            2,
        )],
        PaymentMethod::CashOnDelivery,
    );
    let ctx = TransitionContext::new();

    manager
        .transition_order(&mut order, OrderStatus::Confirmed, &ctx)
        .await
        .unwrap();

    // 4 - 2 = 2 <= threshold 3.
    let lows = bus.named(EventName::StockLow);
    assert_eq!(lows.len(), 1);
    assert_eq!(lows[0].data["stockQuantity"], 2);
}

#[tokio::test]
async fn test_confirmation_emits_stock_out_at_zero() {
    let (manager, _, _, bus) = setup(vec![product("CAKE-CHOC-1KG", 2, 2, 3)]);
    let mut order = order(
        vec![OrderItem::new(
            "CAKE-CHOC-1KG",
            "Chocolate Cake 1kg",
            Money::from_rupees(4000),
            2,
        )],
        PaymentMethod::CashOnDelivery,
    );
    let ctx = TransitionContext::new();

    manager
        .transition_order(&mut order, OrderStatus::Confirmed, &ctx)
        .await
        .unwrap();

    assert_eq!(bus.named(EventName::StockOut).len(), 1);
    assert!(bus.named(EventName::StockLow).is_empty());
}

#[tokio::test]
async fn test_custom_confirmation_requires_estimate_and_bills_advance() {
    let (manager, _, _, bus) = setup(vec![]);
    let mut custom = custom_order();
    let ctx = TransitionContext::new();

    let err = manager
        .transition_custom_order(&mut custom, CustomOrderStatus::Confirmed, &ctx)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::RuleViolation(RuleError::EstimatedPriceMissing)
    ));
    assert_eq!(custom.status, CustomOrderStatus::Pending);

    custom.estimated_price = Some(Money::from_rupees(15000));
    manager
        .transition_custom_order(&mut custom, CustomOrderStatus::Confirmed, &ctx)
        .await
        .unwrap();

    // 15000 > 10000 requires an advance of max(15000 * 0.30, 2000) = 4500.
    assert_eq!(custom.advance_status, AdvanceStatus::Pending);
    assert_eq!(custom.advance_amount, Some(Money::from_rupees(4500)));
    assert_eq!(bus.named(EventName::CustomOrderAdvanceRequested).len(), 1);
    assert!(custom.verify_advance().is_ok());
}

#[tokio::test]
async fn test_custom_production_waits_for_advance() {
    let (manager, _, _, _) = setup(vec![]);
    let mut custom = custom_order();
    custom.estimated_price = Some(Money::from_rupees(15000));
    let ctx = TransitionContext::new();

    manager
        .transition_custom_order(&mut custom, CustomOrderStatus::Confirmed, &ctx)
        .await
        .unwrap();

    let err = manager
        .transition_custom_order(&mut custom, CustomOrderStatus::InProgress, &ctx)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::RuleViolation(RuleError::AdvanceOutstanding { .. })
    ));

    custom.advance_status = AdvanceStatus::Paid;
    manager
        .transition_custom_order(&mut custom, CustomOrderStatus::InProgress, &ctx)
        .await
        .unwrap();
    assert_eq!(custom.status, CustomOrderStatus::InProgress);
}

#[tokio::test]
async fn test_custom_without_advance_requirement_skips_billing() {
    let (manager, _, _, bus) = setup(vec![]);
    let mut custom = custom_order();
    custom.estimated_price = Some(Money::from_rupees(8000));
    let ctx = TransitionContext::new();

    manager
        .transition_custom_order(&mut custom, CustomOrderStatus::Confirmed, &ctx)
        .await
        .unwrap();

    assert_eq!(custom.advance_status, AdvanceStatus::NotRequired);
    assert!(custom.advance_amount.is_none());
    assert!(bus.named(EventName::CustomOrderAdvanceRequested).is_empty());

    // Production may start straight away.
    manager
        .transition_custom_order(&mut custom, CustomOrderStatus::InProgress, &ctx)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_cancelling_paid_advance_initiates_refund() {
    let (manager, _, _, bus) = setup(vec![]);
    let mut custom = custom_order();
    custom.estimated_price = Some(Money::from_rupees(15000));
    let ctx = TransitionContext::new().with_reason("venue cancelled");

    manager
        .transition_custom_order(&mut custom, CustomOrderStatus::Confirmed, &ctx)
        .await
        .unwrap();
    custom.advance_status = AdvanceStatus::Paid;

    manager
        .transition_custom_order(&mut custom, CustomOrderStatus::Cancelled, &ctx)
        .await
        .unwrap();

    let refunds = bus.named(EventName::CustomOrderRefundInitiated);
    assert_eq!(refunds.len(), 1);
    assert_eq!(refunds[0].data["amount"], 4500);
    assert_eq!(refunds[0].data["reason"], "venue cancelled");
}

#[tokio::test]
async fn test_cancelling_unpaid_advance_does_not_refund() {
    let (manager, _, _, bus) = setup(vec![]);
    let mut custom = custom_order();
    custom.estimated_price = Some(Money::from_rupees(15000));
    let ctx = TransitionContext::new();

    manager
        .transition_custom_order(&mut custom, CustomOrderStatus::Confirmed, &ctx)
        .await
        .unwrap();
    manager
        .transition_custom_order(&mut custom, CustomOrderStatus::Cancelled, &ctx)
        .await
        .unwrap();

    assert!(bus.named(EventName::CustomOrderRefundInitiated).is_empty());
}

#[tokio::test]
async fn test_payment_graph_supports_retry() {
    let (manager, _, _, _) = setup(vec![product("CAKE-CHOC-1KG", 10, 0, 3)]);
    let mut order = order(
        vec![OrderItem::new(
            "CAKE-CHOC-1KG",
            "Chocolate Cake 1kg",
            Money::from_rupees(4000),
            1,
        )],
        PaymentMethod::OnlineTransfer,
    );
    let ctx = TransitionContext::new();

    manager
        .transition_payment(&mut order, PaymentStatus::Failed, &ctx)
        .await
        .unwrap();
    manager
        .transition_payment(&mut order, PaymentStatus::Pending, &ctx)
        .await
        .unwrap();
    manager
        .transition_payment(&mut order, PaymentStatus::Paid, &ctx)
        .await
        .unwrap();
    manager
        .transition_payment(&mut order, PaymentStatus::Refunded, &ctx)
        .await
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Refunded);

    let err = manager
        .transition_payment(&mut order, PaymentStatus::Pending, &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::IllegalTransition { .. }));
}

#[tokio::test]
async fn test_pending_payment_cannot_jump_to_refunded() {
    let (manager, _, _, _) = setup(vec![]);
    let mut order = order(vec![], PaymentMethod::OnlineTransfer);
    let ctx = TransitionContext::new();

    let err = manager
        .transition_payment(&mut order, PaymentStatus::Refunded, &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::IllegalTransition { .. }));
    assert_eq!(order.payment_status, PaymentStatus::Pending);
}

#[tokio::test]
async fn test_state_transition_event_carries_context() {
    let (manager, _, _, bus) = setup(vec![product("CAKE-CHOC-1KG", 10, 1, 3)]);
    let mut order = order(
        vec![OrderItem::new(
            "CAKE-CHOC-1KG",
            "Chocolate Cake 1kg",
            Money::from_rupees(4000),
            1,
        )],
        PaymentMethod::CashOnDelivery,
    );
    let ctx = TransitionContext::new().with_actor("admin");

    manager
        .transition_order(&mut order, OrderStatus::Confirmed, &ctx)
        .await
        .unwrap();

    let transitions = bus.named(EventName::StateTransition);
    assert_eq!(transitions.len(), 1);
    let data = &transitions[0].data;
    assert_eq!(data["entity"], "order");
    assert_eq!(data["entityId"], "ORD-PRM-20260807-0001");
    assert_eq!(data["from"], "pending");
    assert_eq!(data["to"], "confirmed");
    assert_eq!(data["actor"], "admin");
}

#[tokio::test]
async fn test_pure_queries_never_error() {
    let (manager, _, _, _) = setup(vec![]);
    let order = order(vec![], PaymentMethod::CashOnDelivery);

    assert!(manager.can_transition_order(&order, OrderStatus::Confirmed));
    assert!(manager.can_transition_order(&order, OrderStatus::Cancelled));
    assert!(!manager.can_transition_order(&order, OrderStatus::Ready));
    assert!(!manager.can_transition_order(&order, OrderStatus::Pending));

    assert_eq!(
        manager.next_order_states(&order),
        vec![OrderStatus::Confirmed, OrderStatus::Cancelled]
    );

    let mut delivered = order.clone();
    delivered.status = OrderStatus::Delivered;
    assert!(manager.next_order_states(&delivered).is_empty());

    let custom = custom_order();
    assert!(manager.can_transition_custom_order(&custom, CustomOrderStatus::Confirmed));
    assert!(!manager.can_transition_custom_order(&custom, CustomOrderStatus::Completed));
    assert_eq!(
        manager.next_custom_order_states(&custom),
        vec![CustomOrderStatus::Confirmed, CustomOrderStatus::Cancelled]
    );

    assert!(manager.can_transition_payment(&order, PaymentStatus::Paid));
    assert!(!manager.can_transition_payment(&order, PaymentStatus::Refunded));
    assert_eq!(
        manager.next_payment_states(&order),
        vec![PaymentStatus::Paid, PaymentStatus::Failed]
    );
}
