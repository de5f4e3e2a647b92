use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    http::{HeaderName, HeaderValue},
    middleware::from_fn_with_state,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod cache;
pub mod config;
pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod ui_state;

// Module for routing segregation (API, static site).
pub mod routes;
use routes::{api, site};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use guard::{Decision, GuardConfig, RouteClass, RouteGuard};

/// ApiDoc
///
/// OpenAPI document for the gateway's JSON endpoints, served at
/// `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health, handlers::get_route_policy, handlers::evaluate_route,
        handlers::get_cache_policy, handlers::get_ui_defaults
    ),
    components(
        schemas(
            models::HealthResponse, models::RoutePolicyResponse, models::RouteDecisionResponse,
            models::CachePolicyResponse, models::InvalidationRule,
            cache::RetryPolicy, guard::GuardConfig, guard::RouteClass,
        )
    ),
    tags(
        (name = "olympus-web", description = "Olympus front-end gateway")
    )
)]
struct ApiDoc;

/// GuardState
///
/// The route guard, shared read-only across requests.
pub type GuardState = Arc<RouteGuard>;

/// ConfigState
///
/// The loaded configuration behind an `Arc`, so extractors projecting it per
/// request only bump a reference count.
pub type ConfigState = Arc<AppConfig>;

/// AppState
///
/// Unified, immutable state shared by every request: configuration and the
/// route guard built from it.
#[derive(Clone)]
pub struct AppState {
    pub config: ConfigState,
    pub guard: GuardState,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let guard = Arc::new(RouteGuard::new(config.guard.clone()));
        Self {
            config: Arc::new(config),
            guard,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for GuardState {
    fn from_ref(app_state: &AppState) -> GuardState {
        app_state.guard.clone()
    }
}

impl FromRef<AppState> for ConfigState {
    fn from_ref(app_state: &AppState) -> ConfigState {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the gateway: API routes, docs and the static-site fallback,
/// all wrapped by the route guard, then the observability and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api::api_routes())
        .merge(site::site_routes(&state.config.static_dir))
        // Guard wraps every route and the fallback; its own request filter
        // lets API, docs and asset requests through.
        .layer(from_fn_with_state(state.clone(), middleware::route_guard))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// cors_layer
///
/// Any origin when none are configured (local development); otherwise only
/// the listed origins. Unparseable origins are logged and skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// trace_span_logger
///
/// Builds the per-request span, tagged with the `x-request-id` set above so
/// every log line of one request correlates.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
