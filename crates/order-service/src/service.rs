//! The order service use cases.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use common::{Money, OrderId, OrderKind};
use domain::{
    AdvanceStatus, CustomOrder, CustomOrderStatus, CustomOrderUpdate, DeliveryDetails,
    NewCustomOrderRequest, NewOrderRequest, Order, OrderItem, OrderStatus, PaymentStatus, Pricing,
};
use events::{BusinessErrorData, EventBus, EventName};
use rules::{RuleError, Rules};
use workflow::{
    PaymentGateway, SideEffectError, StockAdjustment, TransitionContext, WorkflowManager,
};

use crate::analytics::{self, BusinessInsights, CustomerHistory, SalesSummary};
use crate::gateways::RepositoryInventory;
use crate::{CoreError, OrderRepository, ids};

/// The façade callers use to run order use cases end to end.
///
/// Owns the create/cancel lifecycle of both aggregates and is the only
/// component that mutates inventory. Transitions delegate to the workflow
/// manager, which performs its own inventory and advance-payment side
/// effects; the service persists afterwards.
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    rules: Arc<Rules>,
    workflow: WorkflowManager,
    bus: EventBus,
}

impl OrderService {
    /// Wires the service over a repository, a rule set, the opaque payment
    /// gateway and an event bus.
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        rules: Arc<Rules>,
        payments: Arc<dyn PaymentGateway>,
        bus: EventBus,
    ) -> Self {
        let inventory = Arc::new(RepositoryInventory::new(repo.clone()));
        let workflow = WorkflowManager::new(rules.clone(), bus.clone(), inventory, payments);
        Self {
            repo,
            rules,
            workflow,
            bus,
        }
    }

    /// Returns the workflow manager (for read-only transition queries).
    pub fn workflow(&self) -> &WorkflowManager {
        &self.workflow
    }

    /// Returns the event bus.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    // ----- creation ---------------------------------------------------------

    /// Places a standard order.
    ///
    /// Shape validation, placement rules, item resolution, pricing, persist,
    /// stock reservation — in that order. A reservation failure after persist
    /// deletes the order again (compensating delete) and re-raises: an order
    /// never survives without its stock hold.
    #[tracing::instrument(skip(self, request), fields(customer = %request.customer.email))]
    pub async fn create_order(&self, request: NewOrderRequest) -> Result<Order, CoreError> {
        let today = Utc::now().date_naive();
        self.rules.validate_new_order(&request, today)?;

        let mut products = HashMap::new();
        for item in &request.items {
            let product = self.repo.find_product(&item.product_id).await?.ok_or_else(|| {
                RuleError::ProductMissing {
                    product_id: item.product_id.to_string(),
                }
            })?;
            products.insert(item.product_id.clone(), product);
        }

        let placement = self.rules.can_place_order(&request, &products, today);
        if !placement.can_place {
            return Err(CoreError::PlacementRejected {
                errors: placement.errors,
            });
        }

        let mut items = Vec::with_capacity(request.items.len());
        for requested in &request.items {
            let product = &products[&requested.product_id];
            items.push(OrderItem::new(
                product.id.clone(),
                product.name.clone(),
                product.effective_price(),
                requested.quantity,
            ));
        }
        let subtotal: Money = items.iter().map(|i| i.subtotal).sum();

        let city = request
            .customer
            .address
            .city()
            .unwrap_or_default()
            .to_string();
        let quote = self.rules.delivery_quote(subtotal, &city, &request.delivery);
        let pricing = Pricing::new(subtotal, quote.fee);

        let order_id = ids::next_order_id(self.repo.as_ref(), OrderKind::Retail, today).await?;
        let mut order = Order::new(
            order_id,
            request.customer,
            items,
            pricing,
            DeliveryDetails {
                city,
                zone: Some(quote.zone.clone()),
                time_slot: request.delivery.time_slot,
                is_express: request.delivery.is_express,
                customer_tier: request.delivery.customer_tier,
            },
            request.delivery_date,
            request.payment_method,
            request.notes,
        );
        order.verify_pricing()?;

        self.repo.save_order(&order).await?;

        if let Err(error) = self.reserve_items(&order).await {
            self.compensate_failed_creation(&order, &error).await;
            return Err(error.into());
        }

        // Initial transition: a no-op for a freshly created pending order,
        // so entry actions cannot double-apply.
        let ctx = TransitionContext::new();
        self.workflow
            .transition_order(&mut order, OrderStatus::Pending, &ctx)
            .await?;

        self.bus.publish(EventName::OrderCreated, &order);
        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %order.order_id, total = %order.pricing.total, "order created");
        Ok(order)
    }

    /// Places a custom cake order.
    #[tracing::instrument(skip(self, request), fields(customer = %request.customer_email))]
    pub async fn create_custom_order(
        &self,
        request: NewCustomOrderRequest,
    ) -> Result<CustomOrder, CoreError> {
        let today = Utc::now().date_naive();
        self.rules.validate_new_custom_order(&request, today)?;

        let order_id = ids::next_order_id(self.repo.as_ref(), OrderKind::Custom, today).await?;
        let mut custom = CustomOrder::new(
            order_id,
            request.customer_name,
            request.customer_email,
            request.customer_phone,
            request.event_type,
            request.cake_size,
            request.flavor,
            request.requirements,
            request.delivery_date,
            request.customer_notes,
        );

        self.repo.save_custom_order(&custom).await?;

        let ctx = TransitionContext::new();
        self.workflow
            .transition_custom_order(&mut custom, CustomOrderStatus::Pending, &ctx)
            .await?;

        self.bus.publish(EventName::CustomOrderCreated, &custom);
        metrics::counter!("custom_orders_created_total").increment(1);
        tracing::info!(order_id = %custom.order_id, "custom order created");
        Ok(custom)
    }

    async fn reserve_items(&self, order: &Order) -> Result<(), SideEffectError> {
        let mut held: Vec<&OrderItem> = Vec::new();
        for item in &order.items {
            match self
                .repo
                .adjust_stock(&item.product_id, StockAdjustment::Reserve(item.quantity))
                .await
            {
                Ok(_) => held.push(item),
                Err(error) => {
                    // Give back what was taken before re-raising.
                    for done in held {
                        if let Err(release_error) = self
                            .repo
                            .adjust_stock(&done.product_id, StockAdjustment::Release(done.quantity))
                            .await
                        {
                            tracing::error!(
                                product_id = %done.product_id,
                                %release_error,
                                "failed to release partial reservation"
                            );
                        }
                    }
                    return Err(SideEffectError::Stock {
                        product_id: item.product_id.to_string(),
                        message: error.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    async fn compensate_failed_creation(&self, order: &Order, error: &SideEffectError) {
        if let Err(delete_error) = self.repo.delete_order(&order.order_id).await {
            tracing::error!(
                order_id = %order.order_id,
                %delete_error,
                "compensating delete failed, order may be orphaned"
            );
        }
        self.bus.publish(
            EventName::BusinessError,
            &BusinessErrorData {
                operation: "createOrder".to_string(),
                entity_id: Some(order.order_id.to_string()),
                message: error.to_string(),
            },
        );
        metrics::counter!("orders_rolled_back_total").increment(1);
        tracing::warn!(order_id = %order.order_id, %error, "order creation rolled back");
    }

    // ----- status updates ---------------------------------------------------

    /// Moves an order to a new lifecycle status and persists the result.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn update_order_status(
        &self,
        id: &OrderId,
        target: OrderStatus,
        ctx: TransitionContext,
    ) -> Result<Order, CoreError> {
        let mut order = self
            .repo
            .find_order(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.clone()))?;
        self.workflow.transition_order(&mut order, target, &ctx).await?;
        self.repo.save_order(&order).await?;
        Ok(order)
    }

    /// Merges staff-side fields into a custom order, runs the transition,
    /// re-validates advance coherence, then persists.
    #[tracing::instrument(skip(self, update, ctx))]
    pub async fn update_custom_order_status(
        &self,
        id: &OrderId,
        target: CustomOrderStatus,
        update: CustomOrderUpdate,
        ctx: TransitionContext,
    ) -> Result<CustomOrder, CoreError> {
        self.rules.validate_custom_order_update(&update)?;

        let mut custom = self
            .repo
            .find_custom_order(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.clone()))?;

        if let Some(price) = update.estimated_price {
            custom.estimated_price = Some(price);
        }
        if let Some(amount) = update.advance_amount {
            custom.advance_amount = Some(amount);
        }
        if let Some(status) = update.advance_status {
            custom.advance_status = status;
        }
        if let Some(notes) = &update.admin_notes {
            custom.append_admin_note(notes);
        }

        self.workflow
            .transition_custom_order(&mut custom, target, &ctx)
            .await?;
        custom.verify_advance()?;
        self.repo.save_custom_order(&custom).await?;
        Ok(custom)
    }

    /// Moves an order's payment status through the payment graph.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn update_payment_status(
        &self,
        id: &OrderId,
        target: PaymentStatus,
        ctx: TransitionContext,
    ) -> Result<Order, CoreError> {
        let mut order = self
            .repo
            .find_order(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.clone()))?;
        self.workflow
            .transition_payment(&mut order, target, &ctx)
            .await?;
        self.repo.save_order(&order).await?;
        Ok(order)
    }

    /// Records the customer's advance payment on a custom order.
    #[tracing::instrument(skip(self))]
    pub async fn record_advance_payment(&self, id: &OrderId) -> Result<CustomOrder, CoreError> {
        let mut custom = self
            .repo
            .find_custom_order(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.clone()))?;
        if custom.advance_status != AdvanceStatus::Pending {
            return Err(CoreError::NoAdvanceDue(id.clone()));
        }

        custom.advance_status = AdvanceStatus::Paid;
        custom.touch();
        custom.verify_advance()?;
        self.repo.save_custom_order(&custom).await?;

        self.bus.publish(EventName::CustomOrderAdvancePaid, &custom);
        tracing::info!(order_id = %custom.order_id, "advance payment recorded");
        Ok(custom)
    }

    // ----- cancellation -----------------------------------------------------

    /// Cancels a standard order with a reason, rejecting terminal orders.
    #[tracing::instrument(skip(self, reason, actor))]
    pub async fn cancel_order(
        &self,
        id: &OrderId,
        reason: impl Into<String>,
        actor: Option<String>,
    ) -> Result<Order, CoreError> {
        let mut order = self
            .repo
            .find_order(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.clone()))?;
        if order.status.is_terminal() {
            return Err(CoreError::AlreadyClosed {
                id: id.clone(),
                status: order.status.to_string(),
            });
        }

        let reason = reason.into();
        let mut ctx = TransitionContext::new().with_reason(reason.clone());
        if let Some(actor) = &actor {
            ctx = ctx.with_actor(actor.clone());
        }

        self.workflow
            .transition_order(&mut order, OrderStatus::Cancelled, &ctx)
            .await?;
        order.append_note(&cancellation_note(&reason, actor.as_deref(), &ctx));
        self.repo.save_order(&order).await?;
        Ok(order)
    }

    /// Cancels a custom order with a reason, rejecting terminal orders.
    #[tracing::instrument(skip(self, reason, actor))]
    pub async fn cancel_custom_order(
        &self,
        id: &OrderId,
        reason: impl Into<String>,
        actor: Option<String>,
    ) -> Result<CustomOrder, CoreError> {
        let mut custom = self
            .repo
            .find_custom_order(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.clone()))?;
        if custom.status.is_terminal() {
            return Err(CoreError::AlreadyClosed {
                id: id.clone(),
                status: custom.status.to_string(),
            });
        }

        let reason = reason.into();
        let mut ctx = TransitionContext::new().with_reason(reason.clone());
        if let Some(actor) = &actor {
            ctx = ctx.with_actor(actor.clone());
        }

        self.workflow
            .transition_custom_order(&mut custom, CustomOrderStatus::Cancelled, &ctx)
            .await?;
        custom.append_admin_note(&cancellation_note(&reason, actor.as_deref(), &ctx));
        self.repo.save_custom_order(&custom).await?;
        Ok(custom)
    }

    // ----- queries ----------------------------------------------------------

    /// Looks up an order by its public id.
    pub async fn get_order(&self, id: &OrderId) -> Result<Option<Order>, CoreError> {
        Ok(self.repo.find_order(id).await?)
    }

    /// Looks up a custom order by its public id.
    pub async fn get_custom_order(&self, id: &OrderId) -> Result<Option<CustomOrder>, CoreError> {
        Ok(self.repo.find_custom_order(id).await?)
    }

    // ----- analytics (read-only projections) --------------------------------

    /// Aggregates placed orders over a date range.
    pub async fn sales_summary(
        &self,
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    ) -> Result<SalesSummary, CoreError> {
        Ok(analytics::sales_summary(self.repo.as_ref(), from, to).await?)
    }

    /// Order history for one customer, keyed by email.
    pub async fn customer_history(&self, email: &str) -> Result<CustomerHistory, CoreError> {
        Ok(analytics::customer_history(self.repo.as_ref(), email).await?)
    }

    /// Cross-cutting business insights over orders and stock.
    pub async fn business_insights(&self) -> Result<BusinessInsights, CoreError> {
        Ok(analytics::business_insights(self.repo.as_ref()).await?)
    }
}

fn cancellation_note(reason: &str, actor: Option<&str>, ctx: &TransitionContext) -> String {
    format!(
        "Cancelled by {}: {} ({})",
        actor.unwrap_or("customer"),
        reason,
        ctx.occurred_at.format("%Y-%m-%d %H:%M UTC")
    )
}
