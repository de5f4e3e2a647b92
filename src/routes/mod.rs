/// Router Module Index
///
/// Splits the gateway's routes by what they serve. The route guard is not
/// applied here but around the assembled router in `create_router`, so every
/// page request, including the static-site fallback, passes through it.

/// Gateway JSON endpoints under `/api` plus `/health`.
/// Skipped by the guard's request filter.
pub mod api;

/// The exported front-end build, served as a single-page application.
/// Page requests here are subject to the route guard.
pub mod site;
