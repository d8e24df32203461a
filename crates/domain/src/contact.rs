//! Customer contact snapshot.

use serde::{Deserialize, Serialize};

/// Delivery address, either structured or a free-text line.
///
/// The storefront sends structured addresses; older records and phone orders
/// carry a single free-text string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Address {
    Structured {
        street: String,
        city: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        postal_code: Option<String>,
    },
    Freeform(String),
}

impl Address {
    /// Returns the city for zone resolution, if the address carries one.
    pub fn city(&self) -> Option<&str> {
        match self {
            Address::Structured { city, .. } => Some(city),
            Address::Freeform(_) => None,
        }
    }
}

/// Contact details captured on an order at placement time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
}
