use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// API Router Module
///
/// Read-only endpoints the front-end uses to stay in step with the gateway.
/// None of them require authentication: they only describe policy.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for the load balancer.
        .route("/health", get(handlers::health))
        // GET /api/route-policy
        // Prefix lists, login/home targets and the auth cookie name.
        .route("/api/route-policy", get(handlers::get_route_policy))
        // GET /api/route-policy/evaluate?path=/dashboard
        // Guard dry-run using the caller's own cookie.
        .route("/api/route-policy/evaluate", get(handlers::evaluate_route))
        // GET /api/cache-policy
        // Query-client defaults and the mutation invalidation table.
        .route("/api/cache-policy", get(handlers::get_cache_policy))
        // GET /api/ui-defaults
        // Initial sidebar/panel/space state for a new session.
        .route("/api/ui-defaults", get(handlers::get_ui_defaults))
}
