//! Observability for the API
//!
//! Structured JSON logging and a request logging middleware.
//!
//! ```ignore
//! use loja_api::observability::Logger;
//!
//! Logger::info("SERVER_LISTENING", &[("addr", "0.0.0.0:5000")]);
//! ```

mod logger;
mod request_log;

pub use logger::{Logger, Severity};
pub use request_log::log_requests;
