use std::path::Path;

use crate::AppState;
use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

/// Site Router Module
///
/// Serves the exported front-end from `static_dir`. Unknown paths fall back
/// to `index.html` with a 200 so the client-side router can resolve them
/// (`/spaces/<id>`, `/settings/organizations/<id>/members`, ...).
pub fn site_routes(static_dir: &Path) -> Router<AppState> {
    let index = static_dir.join("index.html");
    Router::new().fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(index)))
}
