//! The custom cake order aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use common::{Money, OrderId};
use serde::{Deserialize, Serialize};

use crate::{AdvanceStatus, ConsistencyError, CustomOrderStatus};

/// Cake size options offered for custom orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CakeSize {
    #[serde(rename = "500g")]
    HalfKg,
    #[default]
    #[serde(rename = "1kg")]
    OneKg,
    #[serde(rename = "2kg")]
    TwoKg,
    #[serde(rename = "3kg")]
    ThreeKg,
    #[serde(rename = "Multi-tier")]
    MultiTier,
}

impl CakeSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            CakeSize::HalfKg => "500g",
            CakeSize::OneKg => "1kg",
            CakeSize::TwoKg => "2kg",
            CakeSize::ThreeKg => "3kg",
            CakeSize::MultiTier => "Multi-tier",
        }
    }

    /// Multi-tier cakes always require an advance payment.
    pub fn is_multi_tier(&self) -> bool {
        matches!(self, CakeSize::MultiTier)
    }
}

impl std::fmt::Display for CakeSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A made-to-order custom cake request.
///
/// Contact fields are flattened (no structured address — custom orders are
/// quoted and arranged over the phone). `estimated_price` is set by staff and
/// must exist before the order can be confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomOrder {
    pub order_id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub event_type: String,
    pub cake_size: CakeSize,
    pub flavor: String,
    pub requirements: String,
    pub status: CustomOrderStatus,
    pub estimated_price: Option<Money>,
    pub advance_amount: Option<Money>,
    pub advance_status: AdvanceStatus,
    pub delivery_date: NaiveDate,
    pub admin_notes: String,
    pub customer_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomOrder {
    /// Creates a new custom order in its initial `pending` state.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        order_id: OrderId,
        customer_name: String,
        customer_email: String,
        customer_phone: String,
        event_type: String,
        cake_size: CakeSize,
        flavor: String,
        requirements: String,
        delivery_date: NaiveDate,
        customer_notes: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            order_id,
            customer_name,
            customer_email,
            customer_phone,
            event_type,
            cake_size,
            flavor,
            requirements,
            status: CustomOrderStatus::Pending,
            estimated_price: None,
            advance_amount: None,
            advance_status: AdvanceStatus::NotRequired,
            delivery_date,
            admin_notes: String::new(),
            customer_notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks advance-payment coherence:
    /// a positive advance implies a status other than `not_required`, a
    /// billed status implies a positive advance, and the advance never
    /// exceeds the estimate once both are set.
    pub fn verify_advance(&self) -> Result<(), ConsistencyError> {
        let amount = self.advance_amount.unwrap_or_default();

        if amount.is_positive() && self.advance_status == AdvanceStatus::NotRequired {
            return Err(ConsistencyError::AdvanceWithoutRequirement { amount });
        }
        if self.advance_status != AdvanceStatus::NotRequired && !amount.is_positive() {
            return Err(ConsistencyError::RequirementWithoutAdvance {
                status: self.advance_status.to_string(),
            });
        }
        if let (Some(advance), Some(estimate)) = (self.advance_amount, self.estimated_price)
            && advance > estimate
        {
            return Err(ConsistencyError::AdvanceExceedsEstimate { advance, estimate });
        }
        Ok(())
    }

    /// Appends a line to the admin notes.
    pub fn append_admin_note(&mut self, note: &str) {
        if !self.admin_notes.is_empty() {
            self.admin_notes.push('\n');
        }
        self.admin_notes.push_str(note);
    }

    /// Bumps the modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom_order() -> CustomOrder {
        CustomOrder::new(
            OrderId::new("ORD-CUS-20260807-0001"),
            "Kumari Silva".to_string(),
            "kumari@example.com".to_string(),
            "0712345678".to_string(),
            "Wedding".to_string(),
            CakeSize::MultiTier,
            "Vanilla".to_string(),
            "Three tiers with sugar flowers".to_string(),
            NaiveDate::from_ymd_opt(2026, 9, 20).unwrap(),
            String::new(),
        )
    }

    #[test]
    fn test_new_custom_order_defaults() {
        let order = custom_order();
        assert_eq!(order.status, CustomOrderStatus::Pending);
        assert_eq!(order.advance_status, AdvanceStatus::NotRequired);
        assert!(order.estimated_price.is_none());
        assert!(order.verify_advance().is_ok());
    }

    #[test]
    fn test_advance_without_requirement_is_inconsistent() {
        let mut order = custom_order();
        order.advance_amount = Some(Money::from_rupees(4500));
        assert!(matches!(
            order.verify_advance(),
            Err(ConsistencyError::AdvanceWithoutRequirement { .. })
        ));
    }

    #[test]
    fn test_requirement_without_advance_is_inconsistent() {
        let mut order = custom_order();
        order.advance_status = AdvanceStatus::Pending;
        assert!(matches!(
            order.verify_advance(),
            Err(ConsistencyError::RequirementWithoutAdvance { .. })
        ));
    }

    #[test]
    fn test_advance_must_not_exceed_estimate() {
        let mut order = custom_order();
        order.estimated_price = Some(Money::from_rupees(10000));
        order.advance_amount = Some(Money::from_rupees(12000));
        order.advance_status = AdvanceStatus::Pending;
        assert!(matches!(
            order.verify_advance(),
            Err(ConsistencyError::AdvanceExceedsEstimate { .. })
        ));
    }

    #[test]
    fn test_coherent_advance_passes() {
        let mut order = custom_order();
        order.estimated_price = Some(Money::from_rupees(15000));
        order.advance_amount = Some(Money::from_rupees(4500));
        order.advance_status = AdvanceStatus::Pending;
        assert!(order.verify_advance().is_ok());
    }

    #[test]
    fn test_cake_size_wire_names() {
        assert_eq!(
            serde_json::to_string(&CakeSize::MultiTier).unwrap(),
            "\"Multi-tier\""
        );
        assert_eq!(serde_json::to_string(&CakeSize::OneKg).unwrap(), "\"1kg\"");
        let back: CakeSize = serde_json::from_str("\"500g\"").unwrap();
        assert_eq!(back, CakeSize::HalfKg);
    }
}
