//! # Store
//!
//! The connection-provider seam between HTTP handlers and the database.
//!
//! Every operation acquires its own connection on entry and releases it on
//! every exit path (the pooled connection and any open transaction are
//! dropped, which returns/rolls back). Handlers hold an `Arc<dyn Store>`.
//!
//! Backends:
//! - [`MySqlStore`]: sqlx pool against the MySQL schema
//! - [`MemoryStore`]: in-process tables for tests and `serve --memory`

mod memory;
mod mysql;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

use crate::model::{
    Cart, CartPayload, Customer, CustomerWrite, ListQuery, Order, OrderPayload, Product,
    ProductPayload, Resource,
};

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Backend unreachable (pool timeout, I/O, TLS)
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A row the operation depends on does not exist
    #[error("{} {id} not found", .resource.singular())]
    NotFound { resource: Resource, id: i64 },

    /// Requested cart quantity exceeds current stock
    #[error("Requested {requested} units but only {available} in stock")]
    InsufficientStock { requested: i64, available: i64 },

    /// Statement failed; carries the driver message
    #[error("{0}")]
    Execution(String),
}

impl StoreError {
    /// Whether this error means the backend could not be reached
    pub fn is_connection(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::Connection(err.to_string()),
            other => StoreError::Execution(other.to_string()),
        }
    }
}

/// Data access for the four resources
///
/// `update_*` and `delete_*` return `false` when no row has the given id.
#[async_trait]
pub trait Store: Send + Sync {
    /// Round-trip to the backend
    async fn ping(&self) -> StoreResult<()>;

    // ==================
    // Customers
    // ==================

    async fn create_customer(&self, customer: &CustomerWrite) -> StoreResult<i64>;
    async fn get_customer(&self, id: i64) -> StoreResult<Option<Customer>>;
    async fn list_customers(&self, query: &ListQuery) -> StoreResult<Vec<Customer>>;
    async fn update_customer(&self, id: i64, customer: &CustomerWrite) -> StoreResult<bool>;
    async fn delete_customer(&self, id: i64) -> StoreResult<bool>;

    // ==================
    // Products
    // ==================

    async fn create_product(&self, product: &ProductPayload) -> StoreResult<i64>;
    async fn get_product(&self, id: i64) -> StoreResult<Option<Product>>;
    async fn list_products(&self, query: &ListQuery) -> StoreResult<Vec<Product>>;
    async fn update_product(&self, id: i64, product: &ProductPayload) -> StoreResult<bool>;
    async fn delete_product(&self, id: i64) -> StoreResult<bool>;

    // ==================
    // Carts
    // ==================

    /// Reserve stock and insert the cart line as one unit.
    ///
    /// Fails with `NotFound` when the product is absent and
    /// `InsufficientStock` when `quantity` exceeds stock; in both cases
    /// nothing is written.
    async fn create_cart(&self, cart: &CartPayload) -> StoreResult<i64>;
    async fn get_cart(&self, id: i64) -> StoreResult<Option<Cart>>;
    async fn list_carts(&self, query: &ListQuery) -> StoreResult<Vec<Cart>>;
    async fn list_carts_by_customer(&self, customer_id: i64) -> StoreResult<Vec<Cart>>;
    /// Full replace; stock is not adjusted
    async fn update_cart(&self, id: i64, cart: &CartPayload) -> StoreResult<bool>;
    async fn delete_cart(&self, id: i64) -> StoreResult<bool>;

    // ==================
    // Orders
    // ==================

    async fn create_order(&self, order: &OrderPayload, placed_at: NaiveDateTime) -> StoreResult<i64>;
    async fn get_order(&self, id: i64) -> StoreResult<Option<Order>>;
    async fn list_orders(&self, query: &ListQuery) -> StoreResult<Vec<Order>>;
    async fn list_orders_by_customer(&self, customer_id: i64) -> StoreResult<Vec<Order>>;
}
