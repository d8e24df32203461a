//! Entities and input payloads for the order core.
//!
//! This crate holds plain data: aggregates (`Order`, `CustomOrder`), the
//! `Product` snapshot they reference, lifecycle status enums, and the request
//! payloads callers hand to the order service. Behavior lives elsewhere —
//! rules in the `rules` crate, transitions in the `workflow` crate.

mod contact;
mod custom_order;
mod error;
mod order;
mod product;
mod request;
mod status;

pub use contact::{Address, CustomerInfo};
pub use custom_order::{CakeSize, CustomOrder};
pub use error::ConsistencyError;
pub use order::{DeliveryDetails, Order, OrderItem, Pricing};
pub use product::Product;
pub use request::{
    CustomOrderUpdate, DeliveryOptions, ItemRequest, NewCustomOrderRequest, NewOrderRequest,
};
pub use status::{
    AdvanceStatus, CustomOrderStatus, CustomerTier, OrderStatus, PaymentMethod, PaymentStatus,
    TimeSlot,
};
