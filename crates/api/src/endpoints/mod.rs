//! API endpoints.

mod complaints;
mod dashboard;
mod notifications;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/complaints", complaints::router())
        .nest("/notifications", notifications::router())
        .nest("/dashboard", dashboard::router())
}
