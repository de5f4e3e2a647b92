use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;

use crate::ConfigState;

/// AuthCookie
///
/// The shallow authentication signal the route guard works from: whether the
/// configured token cookie is present with a non-empty value. The token is
/// never decoded or verified here; that happens in the API backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthCookie {
    present: bool,
}

impl AuthCookie {
    /// Inspects the `Cookie` headers for `cookie_name`. A missing header,
    /// unparseable cookie pairs, or an empty value all read as absent.
    pub fn from_headers(headers: &HeaderMap, cookie_name: &str) -> Self {
        let jar = CookieJar::from_headers(headers);
        let present = jar
            .get(cookie_name)
            .is_some_and(|cookie| !cookie.value().is_empty());
        Self { present }
    }

    pub fn present(self) -> bool {
        self.present
    }
}

/// AuthCookie Extractor Implementation
///
/// Never rejects: any failure to read the cookie is "not authenticated",
/// which the guard then handles through its redirect-to-login branch.
impl<S> FromRequestParts<S> for AuthCookie
where
    S: Send + Sync,
    ConfigState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = ConfigState::from_ref(state);
        Ok(Self::from_headers(&parts.headers, &config.auth_cookie))
    }
}
