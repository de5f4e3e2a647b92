use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    cache::{Mutation, QueryDefaults, RetryPolicy},
    guard::{GuardConfig, RouteClass},
};

// --- Response Schemas (exported to the TypeScript front-end) ---

/// HealthResponse
///
/// Liveness payload for load balancers.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct HealthResponse {
    pub status: String,
}

/// RoutePolicyResponse
///
/// The guard's effective configuration, so the front-end can build the same
/// links the gateway redirects to.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RoutePolicyResponse {
    pub auth_cookie: String,
    pub guard: GuardConfig,
}

/// EvaluateQuery
///
/// Query parameters for `GET /api/route-policy/evaluate`.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct EvaluateQuery {
    /// Path to evaluate, must start with '/'.
    pub path: String,
}

/// RouteDecisionResponse
///
/// What the guard would do for `path` given the caller's own cookies.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RouteDecisionResponse {
    pub path: String,
    pub class: RouteClass,
    /// One of `allow`, `redirect_to_login`, `redirect_to_home`.
    pub decision: String,
    pub location: Option<String>,
}

/// InvalidationRule
///
/// One row of the mutation -> invalidated views table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct InvalidationRule {
    pub mutation: String,
    pub invalidates: Vec<String>,
}

impl From<&Mutation> for InvalidationRule {
    fn from(mutation: &Mutation) -> Self {
        Self {
            mutation: mutation.kind().to_string(),
            invalidates: mutation
                .invalidates()
                .iter()
                .map(|key| key.kind().to_string())
                .collect(),
        }
    }
}

/// CachePolicyResponse
///
/// Query-client defaults plus the full invalidation table.
#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct CachePolicyResponse {
    #[ts(type = "number")]
    pub stale_time_ms: u64,
    #[ts(type = "number")]
    pub gc_time_ms: u64,
    pub retry: RetryPolicy,
    pub streaming_retry: RetryPolicy,
    pub invalidations: Vec<InvalidationRule>,
}

impl From<&QueryDefaults> for CachePolicyResponse {
    fn from(defaults: &QueryDefaults) -> Self {
        Self {
            stale_time_ms: u64::try_from(defaults.stale_time.as_millis()).unwrap_or(u64::MAX),
            gc_time_ms: u64::try_from(defaults.gc_time.as_millis()).unwrap_or(u64::MAX),
            retry: defaults.retry,
            streaming_retry: defaults.streaming_retry,
            invalidations: Mutation::catalog().iter().map(InvalidationRule::from).collect(),
        }
    }
}
