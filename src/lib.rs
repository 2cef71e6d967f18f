//! loja-api - JSON API for customers, products, carts and orders over MySQL

pub mod cli;
pub mod config;
pub mod crypto;
pub mod http_server;
pub mod model;
pub mod observability;
pub mod store;
