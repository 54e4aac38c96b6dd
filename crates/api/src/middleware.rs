//! API middleware.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use farol_core::{AnalyticsService, ComplaintService, NotificationService, Principal, Role};

/// Header carrying the authenticated principal's id.
pub const PRINCIPAL_ID_HEADER: &str = "x-principal-id";
/// Header carrying the authenticated principal's role.
pub const PRINCIPAL_ROLE_HEADER: &str = "x-principal-role";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub complaint_service: ComplaintService,
    pub notification_service: NotificationService,
    pub analytics_service: AnalyticsService,
}

/// Principal middleware.
///
/// The identity gateway in front of the API authenticates callers and
/// forwards their id and role as headers. Requests without valid headers
/// pass through unauthenticated.
pub async fn principal_middleware(mut req: Request<Body>, next: Next) -> Response {
    if let Some(principal) = principal_from_headers(&req) {
        req.extensions_mut().insert(principal);
    }
    next.run(req).await
}

fn principal_from_headers(req: &Request<Body>) -> Option<Principal> {
    let headers = req.headers();
    let id = headers.get(PRINCIPAL_ID_HEADER)?.to_str().ok()?.trim();
    let role = headers.get(PRINCIPAL_ROLE_HEADER)?.to_str().ok()?;

    if id.is_empty() {
        return None;
    }
    match role.parse::<Role>() {
        Ok(role) => Some(Principal::new(id, role)),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring principal with unknown role");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(id: Option<&str>, role: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/");
        if let Some(id) = id {
            builder = builder.header(PRINCIPAL_ID_HEADER, id);
        }
        if let Some(role) = role {
            builder = builder.header(PRINCIPAL_ROLE_HEADER, role);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_principal_from_headers() {
        assert_eq!(
            principal_from_headers(&request(Some("s1"), Some("Staff"))),
            Some(Principal::staff("s1"))
        );
        assert_eq!(principal_from_headers(&request(Some("s1"), None)), None);
        assert_eq!(principal_from_headers(&request(Some(" "), Some("admin"))), None);
        assert_eq!(principal_from_headers(&request(Some("s1"), Some("root"))), None);
    }
}
