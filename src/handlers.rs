use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

use crate::{
    ConfigState, GuardState,
    auth::AuthCookie,
    cache::QueryDefaults,
    models::{
        CachePolicyResponse, EvaluateQuery, HealthResponse, RouteDecisionResponse,
        RoutePolicyResponse,
    },
    ui_state::UiSession,
};

/// health
///
/// Unguarded liveness check.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// get_route_policy
///
/// Publishes the guard's prefix lists, redirect targets and cookie name.
#[utoipa::path(
    get,
    path = "/api/route-policy",
    responses((status = 200, description = "Effective route policy", body = RoutePolicyResponse))
)]
pub async fn get_route_policy(State(config): State<ConfigState>) -> Json<RoutePolicyResponse> {
    Json(RoutePolicyResponse {
        auth_cookie: config.auth_cookie.clone(),
        guard: config.guard.clone(),
    })
}

/// evaluate_route
///
/// Dry-runs the guard for `path` with the caller's own cookie. Lets the
/// front-end decide client-side navigation the same way the gateway would.
#[utoipa::path(
    get,
    path = "/api/route-policy/evaluate",
    params(EvaluateQuery),
    responses(
        (status = 200, description = "Guard decision", body = RouteDecisionResponse),
        (status = 400, description = "Path does not start with '/'")
    )
)]
pub async fn evaluate_route(
    State(guard): State<GuardState>,
    auth: AuthCookie,
    Query(query): Query<EvaluateQuery>,
) -> Result<Json<RouteDecisionResponse>, StatusCode> {
    if !query.path.starts_with('/') {
        return Err(StatusCode::BAD_REQUEST);
    }

    let (decision, location) = guard.evaluate(&query.path, auth.present());
    Ok(Json(RouteDecisionResponse {
        class: guard.classify(&query.path),
        decision: decision.label().to_string(),
        location,
        path: query.path,
    }))
}

/// get_cache_policy
///
/// Query-client defaults and which views every mutation invalidates.
#[utoipa::path(
    get,
    path = "/api/cache-policy",
    responses((status = 200, description = "Query cache policy", body = CachePolicyResponse))
)]
pub async fn get_cache_policy() -> Json<CachePolicyResponse> {
    Json(CachePolicyResponse::from(&QueryDefaults::default()))
}

/// get_ui_defaults
///
/// Initial values for a fresh UI session.
#[utoipa::path(
    get,
    path = "/api/ui-defaults",
    responses((status = 200, description = "Initial UI state"))
)]
pub async fn get_ui_defaults() -> Json<UiSession> {
    Json(UiSession::new())
}
