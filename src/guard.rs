use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// Characters escaped when the original path is carried in the `redirect`
/// query parameter. `/` stays readable so the login URL looks like
/// `/login?redirect=/dashboard/spaces`.
const REDIRECT_PARAM: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'`');

/// GuardConfig
///
/// The two prefix lists and two redirect targets the guard works from.
/// Built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct GuardConfig {
    /// Paths that need an auth cookie.
    pub protected_prefixes: Vec<String>,
    /// Paths an authenticated user is bounced away from (login, signup).
    pub auth_only_prefixes: Vec<String>,
    pub login_path: String,
    pub home_path: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            protected_prefixes: ["/dashboard", "/spaces", "/documents", "/settings"]
                .into_iter()
                .map(String::from)
                .collect(),
            auth_only_prefixes: ["/login", "/signup"].into_iter().map(String::from).collect(),
            login_path: "/login".to_string(),
            home_path: "/dashboard".to_string(),
        }
    }
}

/// RouteClass
///
/// Which of the three disjoint categories a path falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RouteClass {
    Protected,
    AuthOnly,
    Public,
}

/// Decision
///
/// The single outcome of one guard evaluation. Lives only for the
/// request/response cycle it was computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Forward the request unmodified.
    Allow,
    /// Send the visitor to the login page, remembering where they were going.
    RedirectToLogin { original_path: String },
    /// Already signed in; leave the login/signup pages.
    RedirectToHome,
}

impl Decision {
    /// Short label used in logs and the evaluate endpoint.
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::RedirectToLogin { .. } => "redirect_to_login",
            Decision::RedirectToHome => "redirect_to_home",
        }
    }

    /// Redirect target for this decision, `None` for `Allow`.
    pub fn location(&self, config: &GuardConfig) -> Option<String> {
        match self {
            Decision::Allow => None,
            Decision::RedirectToLogin { original_path } => Some(format!(
                "{}?redirect={}",
                config.login_path,
                utf8_percent_encode(original_path, REDIRECT_PARAM)
            )),
            Decision::RedirectToHome => Some(config.home_path.clone()),
        }
    }
}

/// RouteGuard
///
/// Pure function from (path, auth cookie present) to a `Decision`.
/// Holds no mutable state; concurrent requests evaluate independently.
#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    config: GuardConfig,
}

impl RouteGuard {
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Prefix-based, case-sensitive. The protected list is consulted first,
    /// so an overlapping prefix classifies as `Protected`.
    pub fn classify(&self, path: &str) -> RouteClass {
        if matches_any(path, &self.config.protected_prefixes) {
            RouteClass::Protected
        } else if matches_any(path, &self.config.auth_only_prefixes) {
            RouteClass::AuthOnly
        } else {
            RouteClass::Public
        }
    }

    /// decide
    ///
    /// Only cookie presence is checked here. Signature, expiry and payload
    /// of the token are the backend's concern.
    pub fn decide(&self, path: &str, auth_present: bool) -> Decision {
        match (self.classify(path), auth_present) {
            (RouteClass::Protected, false) => Decision::RedirectToLogin {
                original_path: path.to_string(),
            },
            (RouteClass::AuthOnly, true) => Decision::RedirectToHome,
            _ => Decision::Allow,
        }
    }

    /// Convenience wrapper: decision plus its redirect target.
    pub fn evaluate(&self, path: &str, auth_present: bool) -> (Decision, Option<String>) {
        let decision = self.decide(path, auth_present);
        let location = decision.location(&self.config);
        (decision, location)
    }
}

fn matches_any(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}
