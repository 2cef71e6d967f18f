//! # HTTP Server Module
//!
//! JSON API over the store.
//!
//! # Endpoints
//!
//! - `/` and `/health` - Liveness and database health
//! - `/clientes` - Customers
//! - `/produtos` - Products
//! - `/carrinhos` - Cart lines (creation reserves stock)
//! - `/pedidos` - Orders

pub mod cart_routes;
pub mod common;
pub mod config;
pub mod customer_routes;
pub mod errors;
pub mod health_routes;
pub mod order_routes;
pub mod product_routes;
pub mod server;

pub use common::ApiState;
pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult};
pub use server::HttpServer;
