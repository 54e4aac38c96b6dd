//! HTTP API layer for farol.
//!
//! - **Endpoints**: complaints, notifications, dashboard and exports
//! - **Extractors**: the acting principal
//! - **Middleware**: principal headers from the identity gateway
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
