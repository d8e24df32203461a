//! Public order-id generation.

use chrono::{NaiveDate, Utc};
use common::{OrderId, OrderKind};

use crate::{OrderRepository, StorageError};

const MAX_COLLISION_BUMPS: u32 = 25;

/// Allocates the next public id for an order placed today.
///
/// The happy path encodes a zero-padded daily sequence; when the sequence
/// query fails the id falls back to a timestamp-derived suffix. Either way
/// the candidate is re-checked against existing ids before it is handed out.
pub(crate) async fn next_order_id(
    repo: &dyn OrderRepository,
    kind: OrderKind,
    today: NaiveDate,
) -> Result<OrderId, StorageError> {
    let mut candidate = match repo.orders_placed_on(kind, today).await {
        Ok(count) => OrderId::with_sequence(kind, today, count as u32 + 1),
        Err(error) => {
            tracing::warn!(%error, "daily sequence unavailable, using timestamp suffix");
            timestamp_fallback(kind, today)
        }
    };

    let mut bumps = 0;
    while repo.order_id_exists(&candidate).await? {
        bumps += 1;
        if bumps > MAX_COLLISION_BUMPS {
            return Err(StorageError::Conflict(format!(
                "could not allocate an order id for {} on {today}",
                kind.code()
            )));
        }
        candidate = match candidate.parse() {
            Ok(parsed) => OrderId::with_sequence(kind, today, parsed.sequence + 1),
            Err(_) => timestamp_fallback(kind, today),
        };
    }

    Ok(candidate)
}

fn timestamp_fallback(kind: OrderKind, today: NaiveDate) -> OrderId {
    let suffix = format!("{:06}", Utc::now().timestamp_millis() % 1_000_000);
    OrderId::with_suffix(kind, today, &suffix)
}
