//! Payload structs shared by multiple publishers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload of the generic `stateTransition` event emitted for every
/// successful transition regardless of entity type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateTransitionData {
    /// Which state machine transitioned ("order", "customOrder", "payment").
    pub entity: String,

    /// Public id of the entity.
    pub entity_id: String,

    /// State before the transition.
    pub from: String,

    /// State after the transition.
    pub to: String,

    /// Optional reason supplied by the caller.
    pub reason: Option<String>,

    /// Who requested the transition.
    pub actor: Option<String>,

    /// When the transition ran.
    pub occurred_at: DateTime<Utc>,
}

/// Payload of the `businessError` event, emitted when a side effect fails
/// after the core decision was already made.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessErrorData {
    /// The operation that failed ("createOrder", "commitStock", ...).
    pub operation: String,

    /// Public id of the entity involved, when known.
    pub entity_id: Option<String>,

    /// Human-readable error description.
    pub message: String,
}

/// Payload of the `stockLow` / `stockOut` / `stockRestored` events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevelData {
    /// The affected product.
    pub product_id: String,

    /// Product name snapshot.
    pub product_name: String,

    /// On-hand stock after the adjustment.
    pub stock_quantity: i64,

    /// The product's low-stock threshold.
    pub low_stock_threshold: i64,
}
