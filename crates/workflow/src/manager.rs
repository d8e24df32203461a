//! The transition engine.

use std::sync::Arc;

use chrono::Utc;
use common::Money;
use domain::{
    AdvanceStatus, CustomOrder, CustomOrderStatus, Order, OrderStatus, PaymentMethod,
    PaymentStatus, Product,
};
use events::{EventBus, EventName, StateTransitionData, StockLevelData};
use rules::{RuleError, Rules};
use serde::Serialize;

use crate::{
    CustomEntryCheck, EntityKind, InventoryGateway, OrderEntryCheck, PaymentGateway,
    StockAdjustment, TransitionContext, WorkflowError, WorkflowState, custom_entry_checks,
    order_entry_checks,
};

/// Whether a transition call changed anything.
///
/// Asking for the state an entity is already in is a no-op, not an error —
/// entry actions must not run twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied,
    NoChange,
}

impl TransitionOutcome {
    pub fn applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AdvanceRequestedData {
    order_id: String,
    amount: Money,
    estimated_price: Money,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefundInitiatedData {
    order_id: String,
    amount: Money,
    reason: Option<String>,
}

/// Drives entities through their lifecycle graphs.
///
/// A transition runs: graph legality, the rules engine's independent table
/// (the two copies must agree), the target state's pre-entry checks, the exit
/// hook, the in-memory status mutation, the entry action with its side
/// effects, and finally a `stateTransition` event. Persistence is the
/// caller's job after the call returns.
pub struct WorkflowManager {
    rules: Arc<Rules>,
    bus: EventBus,
    inventory: Arc<dyn InventoryGateway>,
    payments: Arc<dyn PaymentGateway>,
}

impl WorkflowManager {
    pub fn new(
        rules: Arc<Rules>,
        bus: EventBus,
        inventory: Arc<dyn InventoryGateway>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            rules,
            bus,
            inventory,
            payments,
        }
    }

    /// Returns the event bus transitions publish to.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    // ----- standard orders --------------------------------------------------

    /// Moves an order to `target`, running checks and entry actions.
    #[tracing::instrument(skip(self, order, ctx), fields(order_id = %order.order_id))]
    pub async fn transition_order(
        &self,
        order: &mut Order,
        target: OrderStatus,
        ctx: &TransitionContext,
    ) -> Result<TransitionOutcome, WorkflowError> {
        let current = order.status;
        if current == target {
            tracing::debug!(state = %current, "already in target state, no-op");
            return Ok(TransitionOutcome::NoChange);
        }
        if !current.can_transition_to(target) {
            return Err(WorkflowError::IllegalTransition {
                entity: EntityKind::Order,
                from: current.as_str(),
                to: target.as_str(),
            });
        }
        if !self.rules.order_transition_allowed(current, target) {
            return Err(RuleError::TransitionDisallowed {
                entity: "order",
                from: current.to_string(),
                to: target.to_string(),
            }
            .into());
        }
        for check in order_entry_checks(target) {
            self.run_order_check(*check, order).await?;
        }

        tracing::debug!(from = %current, to = %target, "leaving state");
        order.status = target;
        order.touch();
        self.enter_order_state(order, current).await?;

        metrics::counter!("workflow_transitions_total", "entity" => "order").increment(1);
        self.emit_state_transition(
            EntityKind::Order,
            order.order_id.as_str(),
            current.as_str(),
            target.as_str(),
            ctx,
        );
        tracing::info!(from = %current, to = %target, "order transitioned");
        Ok(TransitionOutcome::Applied)
    }

    /// Pure query: is `current -> target` legal for this order right now?
    /// Never errors; unknown or same-state pairs simply return false.
    pub fn can_transition_order(&self, order: &Order, target: OrderStatus) -> bool {
        order.status != target
            && order.status.can_transition_to(target)
            && self.rules.order_transition_allowed(order.status, target)
    }

    /// Pure query: every state this order may move to next.
    pub fn next_order_states(&self, order: &Order) -> Vec<OrderStatus> {
        order
            .status
            .allowed_transitions()
            .iter()
            .copied()
            .filter(|t| self.rules.order_transition_allowed(order.status, *t))
            .collect()
    }

    async fn run_order_check(
        &self,
        check: OrderEntryCheck,
        order: &Order,
    ) -> Result<(), WorkflowError> {
        match check {
            OrderEntryCheck::StockAvailable => {
                for item in &order.items {
                    let product = self.inventory.product(&item.product_id).await?.ok_or_else(
                        || RuleError::ProductMissing {
                            product_id: item.product_id.to_string(),
                        },
                    )?;
                    self.rules.check_stock_on_hand(&product, item.quantity)?;
                }
                Ok(())
            }
            OrderEntryCheck::DeliveryNotice => Ok(self
                .rules
                .check_retail_notice(order.delivery_date, Utc::now().date_naive())?),
            OrderEntryCheck::CustomerInfo => Ok(self.rules.check_customer_info(&order.customer)?),
            OrderEntryCheck::PaymentInitiated => match order.payment_method {
                PaymentMethod::CashOnDelivery => Ok(()),
                PaymentMethod::OnlineTransfer => {
                    if order.payment_status != PaymentStatus::Pending {
                        return Ok(());
                    }
                    if self.payments.payment_initiated(&order.order_id).await? {
                        Ok(())
                    } else {
                        Err(RuleError::PaymentNotInitiated.into())
                    }
                }
            },
        }
    }

    async fn enter_order_state(
        &self,
        order: &Order,
        previous: OrderStatus,
    ) -> Result<(), WorkflowError> {
        match order.status {
            OrderStatus::Pending => {
                // Reservations are taken at creation time; entering pending
                // only announces the hold.
                tracing::info!(items = order.items.len(), "stock hold recorded");
            }
            OrderStatus::Confirmed => {
                for item in &order.items {
                    let product = self
                        .inventory
                        .apply(&item.product_id, StockAdjustment::Commit(item.quantity))
                        .await?;
                    self.emit_stock_level(&product);
                }
            }
            OrderStatus::Cancelled => match previous {
                // A pending order only ever held a reservation.
                OrderStatus::Pending => {
                    for item in &order.items {
                        self.inventory
                            .apply(&item.product_id, StockAdjustment::Release(item.quantity))
                            .await?;
                    }
                }
                // Confirmed and preparing orders already consumed stock.
                OrderStatus::Confirmed | OrderStatus::Preparing => {
                    for item in &order.items {
                        let product = self
                            .inventory
                            .apply(&item.product_id, StockAdjustment::Restore(item.quantity))
                            .await?;
                        self.bus.publish(
                            EventName::StockRestored,
                            &StockLevelData {
                                product_id: product.id.to_string(),
                                product_name: product.name.clone(),
                                stock_quantity: product.stock_quantity,
                                low_stock_threshold: product.low_stock_threshold,
                            },
                        );
                    }
                }
                _ => {}
            },
            OrderStatus::Preparing | OrderStatus::Ready | OrderStatus::Delivered => {}
        }

        self.bus.publish(order_event(order.status), order);
        Ok(())
    }

    // ----- custom orders ----------------------------------------------------

    /// Moves a custom order to `target`, running checks and entry actions.
    #[tracing::instrument(skip(self, custom, ctx), fields(order_id = %custom.order_id))]
    pub async fn transition_custom_order(
        &self,
        custom: &mut CustomOrder,
        target: CustomOrderStatus,
        ctx: &TransitionContext,
    ) -> Result<TransitionOutcome, WorkflowError> {
        let current = custom.status;
        if current == target {
            tracing::debug!(state = %current, "already in target state, no-op");
            return Ok(TransitionOutcome::NoChange);
        }
        if !current.can_transition_to(target) {
            return Err(WorkflowError::IllegalTransition {
                entity: EntityKind::CustomOrder,
                from: current.as_str(),
                to: target.as_str(),
            });
        }
        if !self.rules.custom_order_transition_allowed(current, target) {
            return Err(RuleError::TransitionDisallowed {
                entity: "customOrder",
                from: current.to_string(),
                to: target.to_string(),
            }
            .into());
        }
        for check in custom_entry_checks(target) {
            self.run_custom_check(*check, custom)?;
        }

        tracing::debug!(from = %current, to = %target, "leaving state");
        custom.status = target;
        custom.touch();
        self.enter_custom_state(custom, ctx);

        metrics::counter!("workflow_transitions_total", "entity" => "customOrder").increment(1);
        self.emit_state_transition(
            EntityKind::CustomOrder,
            custom.order_id.as_str(),
            current.as_str(),
            target.as_str(),
            ctx,
        );
        tracing::info!(from = %current, to = %target, "custom order transitioned");
        Ok(TransitionOutcome::Applied)
    }

    /// Pure query, custom-order flavor of [`Self::can_transition_order`].
    pub fn can_transition_custom_order(
        &self,
        custom: &CustomOrder,
        target: CustomOrderStatus,
    ) -> bool {
        custom.status != target
            && custom.status.can_transition_to(target)
            && self.rules.custom_order_transition_allowed(custom.status, target)
    }

    /// Pure query: every state this custom order may move to next.
    pub fn next_custom_order_states(&self, custom: &CustomOrder) -> Vec<CustomOrderStatus> {
        custom
            .status
            .allowed_transitions()
            .iter()
            .copied()
            .filter(|t| self.rules.custom_order_transition_allowed(custom.status, *t))
            .collect()
    }

    fn run_custom_check(
        &self,
        check: CustomEntryCheck,
        custom: &CustomOrder,
    ) -> Result<(), WorkflowError> {
        match check {
            CustomEntryCheck::EstimatedPriceSet => {
                if custom.estimated_price.is_none() {
                    return Err(RuleError::EstimatedPriceMissing.into());
                }
                Ok(())
            }
            CustomEntryCheck::DeliveryWindow => Ok(self
                .rules
                .check_custom_window(custom.delivery_date, Utc::now().date_naive())?),
            CustomEntryCheck::AdvanceSettled => {
                if custom.advance_status == AdvanceStatus::Pending {
                    return Err(RuleError::AdvanceOutstanding {
                        amount: custom.advance_amount.unwrap_or_default(),
                    }
                    .into());
                }
                Ok(())
            }
        }
    }

    fn enter_custom_state(&self, custom: &mut CustomOrder, ctx: &TransitionContext) {
        match custom.status {
            CustomOrderStatus::Confirmed => {
                // Bill the advance on first confirmation when the order
                // qualifies and nothing has been billed yet.
                if custom.advance_status == AdvanceStatus::NotRequired
                    && self.rules.advance_required(custom)
                    && let Some(estimate) = custom.estimated_price
                {
                    let amount = self.rules.advance_amount(estimate);
                    custom.advance_amount = Some(amount);
                    custom.advance_status = AdvanceStatus::Pending;
                    self.bus.publish(
                        EventName::CustomOrderAdvanceRequested,
                        &AdvanceRequestedData {
                            order_id: custom.order_id.to_string(),
                            amount,
                            estimated_price: estimate,
                        },
                    );
                    tracing::info!(%amount, "advance payment requested");
                }
            }
            CustomOrderStatus::Cancelled => {
                // A paid advance is returned through the external gateway;
                // the core only initiates.
                if custom.advance_status == AdvanceStatus::Paid {
                    self.bus.publish(
                        EventName::CustomOrderRefundInitiated,
                        &RefundInitiatedData {
                            order_id: custom.order_id.to_string(),
                            amount: custom.advance_amount.unwrap_or_default(),
                            reason: ctx.reason.clone(),
                        },
                    );
                    tracing::info!("advance refund initiated");
                }
            }
            CustomOrderStatus::Pending
            | CustomOrderStatus::InProgress
            | CustomOrderStatus::Completed => {}
        }

        self.bus.publish(custom_event(custom.status), custom);
    }

    // ----- payments ---------------------------------------------------------

    /// Moves an order's payment status through the payment graph.
    #[tracing::instrument(skip(self, order, ctx), fields(order_id = %order.order_id))]
    pub async fn transition_payment(
        &self,
        order: &mut Order,
        target: PaymentStatus,
        ctx: &TransitionContext,
    ) -> Result<TransitionOutcome, WorkflowError> {
        let current = order.payment_status;
        if current == target {
            tracing::debug!(state = %current, "already in target state, no-op");
            return Ok(TransitionOutcome::NoChange);
        }
        if !current.can_transition_to(target) {
            return Err(WorkflowError::IllegalTransition {
                entity: EntityKind::Payment,
                from: current.as_str(),
                to: target.as_str(),
            });
        }
        if !self.rules.payment_transition_allowed(current, target) {
            return Err(RuleError::TransitionDisallowed {
                entity: "payment",
                from: current.to_string(),
                to: target.to_string(),
            }
            .into());
        }

        order.payment_status = target;
        order.touch();
        self.bus.publish(payment_event(target), order);

        metrics::counter!("workflow_transitions_total", "entity" => "payment").increment(1);
        self.emit_state_transition(
            EntityKind::Payment,
            order.order_id.as_str(),
            current.as_str(),
            target.as_str(),
            ctx,
        );
        tracing::info!(from = %current, to = %target, "payment transitioned");
        Ok(TransitionOutcome::Applied)
    }

    /// Pure query, payment flavor of [`Self::can_transition_order`].
    pub fn can_transition_payment(&self, order: &Order, target: PaymentStatus) -> bool {
        order.payment_status != target
            && order.payment_status.can_transition_to(target)
            && self.rules.payment_transition_allowed(order.payment_status, target)
    }

    /// Pure query: every payment state this order may move to next.
    pub fn next_payment_states(&self, order: &Order) -> Vec<PaymentStatus> {
        order
            .payment_status
            .allowed_transitions()
            .iter()
            .copied()
            .filter(|t| self.rules.payment_transition_allowed(order.payment_status, *t))
            .collect()
    }

    // ----- shared -----------------------------------------------------------

    fn emit_stock_level(&self, product: &Product) {
        if product.made_to_order {
            return;
        }
        let data = StockLevelData {
            product_id: product.id.to_string(),
            product_name: product.name.clone(),
            stock_quantity: product.stock_quantity,
            low_stock_threshold: product.low_stock_threshold,
        };
        if product.is_out_of_stock() {
            self.bus.publish(EventName::StockOut, &data);
        } else if product.is_low_stock() {
            self.bus.publish(EventName::StockLow, &data);
        }
    }

    fn emit_state_transition(
        &self,
        entity: EntityKind,
        entity_id: &str,
        from: &str,
        to: &str,
        ctx: &TransitionContext,
    ) {
        self.bus.publish(
            EventName::StateTransition,
            &StateTransitionData {
                entity: entity.as_str().to_string(),
                entity_id: entity_id.to_string(),
                from: from.to_string(),
                to: to.to_string(),
                reason: ctx.reason.clone(),
                actor: ctx.actor.clone(),
                occurred_at: ctx.occurred_at,
            },
        );
    }
}

fn order_event(status: OrderStatus) -> EventName {
    match status {
        OrderStatus::Pending => EventName::OrderPending,
        OrderStatus::Confirmed => EventName::OrderConfirmed,
        OrderStatus::Preparing => EventName::OrderPreparing,
        OrderStatus::Ready => EventName::OrderReady,
        OrderStatus::Delivered => EventName::OrderDelivered,
        OrderStatus::Cancelled => EventName::OrderCancelled,
    }
}

fn custom_event(status: CustomOrderStatus) -> EventName {
    match status {
        CustomOrderStatus::Pending => EventName::CustomOrderPending,
        CustomOrderStatus::Confirmed => EventName::CustomOrderConfirmed,
        CustomOrderStatus::InProgress => EventName::CustomOrderInProgress,
        CustomOrderStatus::Completed => EventName::CustomOrderCompleted,
        CustomOrderStatus::Cancelled => EventName::CustomOrderCancelled,
    }
}

fn payment_event(status: PaymentStatus) -> EventName {
    match status {
        PaymentStatus::Pending => EventName::PaymentPending,
        PaymentStatus::Paid => EventName::PaymentPaid,
        PaymentStatus::Failed => EventName::PaymentFailed,
        PaymentStatus::Refunded => EventName::PaymentRefunded,
    }
}
