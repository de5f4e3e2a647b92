use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{GuardState, auth::AuthCookie};

/// Path prefixes that never reach the guard: the gateway's own API and docs,
/// plus the front-end framework's build output.
const UNGUARDED_PREFIXES: &[&str] = &[
    "/api/",
    "/api-docs",
    "/swagger-ui",
    "/_next/",
    "/static/",
    "/assets/",
];

/// Extensions of build assets served from the site root. A page path such as
/// `/spaces/acme.inc` or `/documents/report.pdf` is not in this list and
/// stays guarded.
const ASSET_EXTENSIONS: &[&str] = &[
    "js", "mjs", "css", "map", "ico", "png", "jpg", "jpeg", "gif", "svg", "webp", "avif",
    "woff", "woff2", "ttf", "otf", "txt", "xml", "webmanifest", "json",
];

/// should_guard
///
/// The request filter in front of the guard. API routes, framework internals
/// and static build assets (e.g. `/favicon.ico`, `/robots.txt`) pass
/// straight through.
pub fn should_guard(path: &str) -> bool {
    if path == "/api" || path == "/health" {
        return false;
    }
    if UNGUARDED_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return false;
    }
    !is_asset(path)
}

fn is_asset(path: &str) -> bool {
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    last_segment
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && ASSET_EXTENSIONS.contains(&ext))
}

/// route_guard
///
/// Middleware applied to the whole router. Filtered paths and `Allow`
/// decisions run the rest of the stack untouched; redirect decisions are
/// answered here with `307 Temporary Redirect`.
pub async fn route_guard(
    State(guard): State<GuardState>,
    auth: AuthCookie,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    if !should_guard(&path) {
        return next.run(request).await;
    }

    let decision = guard.decide(&path, auth.present());
    match decision.location(guard.config()) {
        None => next.run(request).await,
        Some(location) => {
            tracing::debug!(
                path = %path,
                decision = decision.label(),
                location = %location,
                "route guard redirect"
            );
            Redirect::temporary(&location).into_response()
        }
    }
}
