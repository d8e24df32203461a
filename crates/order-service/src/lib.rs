//! Order orchestration.
//!
//! [`OrderService`] is the façade callers use: it wires the validators, the
//! rules engine, the workflow manager and the persistence collaborator into
//! the end-to-end use cases — placing orders (with stock reservation and a
//! compensating delete on failure), driving status and payment updates,
//! cancellations, the custom-order advance sub-lifecycle, and read-only
//! analytics.

pub mod analytics;
mod error;
mod gateways;
mod ids;
mod memory;
mod postgres;
mod repository;
mod service;

pub use error::{CoreError, StorageError};
pub use gateways::{InMemoryPaymentGateway, RepositoryInventory};
pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;
pub use repository::OrderRepository;
pub use service::OrderService;
