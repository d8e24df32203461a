//! Rule configuration.
//!
//! Built once at startup and injected into [`crate::Rules`]; the values are
//! never mutated afterwards. Defaults carry the shop's production constants.

use common::Money;
use domain::CustomerTier;
use serde::{Deserialize, Serialize};

/// A delivery-fee zone: a set of cities sharing a flat fee and a
/// free-delivery threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub code: String,
    pub name: String,
    /// Cities matched case-insensitively against the delivery city.
    pub cities: Vec<String>,
    pub fee: Money,
    pub free_threshold: Money,
}

impl ZoneConfig {
    /// Returns true if the zone covers the given city.
    pub fn covers(&self, city: &str) -> bool {
        let city = city.trim();
        self.cities.iter().any(|c| c.eq_ignore_ascii_case(city))
    }
}

/// Delivery fee configuration: named zones plus a catch-all, and the
/// multiplicative adjustments applied on top of the zone fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryFeeConfig {
    pub zones: Vec<ZoneConfig>,
    /// Catch-all zone applied when no city list matches. Its fee and
    /// threshold are the legacy flat-rate constants.
    pub other: ZoneConfig,
    /// Multiplier applied to the fee for express deliveries.
    pub express_multiplier: f64,
    /// Fractional discount for silver-tier customers.
    pub silver_discount: f64,
    /// Fractional discount for gold-tier customers.
    pub gold_discount: f64,
}

impl DeliveryFeeConfig {
    /// Resolves the zone for a city, falling back to the catch-all.
    pub fn zone_for(&self, city: &str) -> &ZoneConfig {
        self.zones
            .iter()
            .find(|z| z.covers(city))
            .unwrap_or(&self.other)
    }

    /// The fee multiplier for a customer tier.
    pub fn tier_factor(&self, tier: CustomerTier) -> f64 {
        match tier {
            CustomerTier::Regular => 1.0,
            CustomerTier::Silver => 1.0 - self.silver_discount,
            CustomerTier::Gold => 1.0 - self.gold_discount,
        }
    }
}

impl Default for DeliveryFeeConfig {
    fn default() -> Self {
        Self {
            zones: vec![
                ZoneConfig {
                    code: "colombo".to_string(),
                    name: "Colombo Metro".to_string(),
                    cities: vec![
                        "Colombo".to_string(),
                        "Dehiwala".to_string(),
                        "Mount Lavinia".to_string(),
                        "Nugegoda".to_string(),
                        "Rajagiriya".to_string(),
                        "Kotte".to_string(),
                    ],
                    fee: Money::from_rupees(350),
                    free_threshold: Money::from_rupees(7500),
                },
                ZoneConfig {
                    code: "suburbs".to_string(),
                    name: "Western Suburbs".to_string(),
                    cities: vec![
                        "Moratuwa".to_string(),
                        "Panadura".to_string(),
                        "Kalutara".to_string(),
                        "Negombo".to_string(),
                        "Gampaha".to_string(),
                        "Kadawatha".to_string(),
                    ],
                    fee: Money::from_rupees(450),
                    free_threshold: Money::from_rupees(9000),
                },
            ],
            other: ZoneConfig {
                code: "other".to_string(),
                name: "Other Areas".to_string(),
                cities: vec![],
                fee: Money::from_rupees(500),
                free_threshold: Money::from_rupees(9000),
            },
            express_multiplier: 1.5,
            silver_discount: 0.10,
            gold_discount: 0.20,
        }
    }
}

/// Advance-payment configuration for custom orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvanceConfig {
    /// Estimated prices above this require an advance.
    pub price_threshold: Money,
    /// Fraction of the estimate collected as advance.
    pub fraction: f64,
    /// Minimum advance regardless of the fraction.
    pub minimum: Money,
    /// Special-requirements texts longer than this require an advance.
    pub requirements_limit: usize,
}

impl Default for AdvanceConfig {
    fn default() -> Self {
        Self {
            price_threshold: Money::from_rupees(10000),
            fraction: 0.30,
            minimum: Money::from_rupees(2000),
            requirements_limit: 100,
        }
    }
}

/// Advance-notice configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeConfig {
    /// Standard orders: delivery no earlier than this many days ahead.
    pub retail_min_days: i64,
    /// Custom orders: delivery no earlier than this many days ahead.
    pub custom_min_days: i64,
    /// Custom orders: delivery no later than this many months ahead.
    pub custom_max_months: u32,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            retail_min_days: 1,
            custom_min_days: 7,
            custom_max_months: 6,
        }
    }
}

/// The complete rule configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RuleConfig {
    pub delivery: DeliveryFeeConfig,
    pub advance: AdvanceConfig,
    pub notice: NoticeConfig,
}
