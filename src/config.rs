use std::{env, net::SocketAddr, path::PathBuf};

use crate::guard::GuardConfig;

/// AppConfig
///
/// Holds the gateway's entire configuration. Immutable once loaded and pulled
/// into handlers through `FromRef`, like the rest of the unified state.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects log format and fail-fast rules.
    pub env: Env,
    // Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
    // Name of the cookie that carries the authentication token.
    pub auth_cookie: String,
    // Directory holding the exported front-end build (index.html + assets).
    pub static_dir: PathBuf,
    // Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
    // Prefix lists and redirect targets for the route guard.
    pub guard: GuardConfig,
}

/// Env
///
/// Runtime context: pretty logs and relaxed defaults locally, JSON logs and
/// mandatory settings in production.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// ConfigError
///
/// Everything that can make `AppConfig::load` refuse to start the gateway.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be set in production")]
    Missing { name: &'static str },
    #[error("invalid BIND_ADDR {value:?}: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("{name} must start with '/': {value:?}")]
    NotAPath { name: &'static str, value: String },
    #[error("{name} must contain at least one prefix")]
    EmptyPrefixList { name: &'static str },
    #[error("prefix {prefix:?} is both protected and auth-only")]
    OverlappingPrefix { prefix: String },
    #[error("{name} {path:?} falls under {prefix:?} and would redirect to itself")]
    RedirectLoop {
        name: &'static str,
        path: String,
        prefix: String,
    },
}

pub const DEFAULT_AUTH_COOKIE: &str = "auth_token";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_STATIC_DIR: &str = "./web/out";

impl Default for AppConfig {
    /// Local defaults used by tests and `cargo run` without a `.env`.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            auth_cookie: DEFAULT_AUTH_COOKIE.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            cors_origins: Vec::new(),
            guard: GuardConfig::default(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables (after `.env` has
    /// been loaded by the caller). Unset variables fall back to the built-in
    /// defaults, except that production requires `CORS_ORIGINS`.
    ///
    /// # Errors
    /// Returns a `ConfigError` for a malformed value or a missing production
    /// setting, so the process never starts half-configured.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let bind_raw = var_or("BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::BindAddr {
                value: bind_raw.clone(),
                source,
            })?;

        // A blank CORS_ORIGINS counts as unset, which in production would
        // mean "any origin".
        let cors_origins = match (env, list_var("CORS_ORIGINS")) {
            (_, Some(origins)) => origins,
            (Env::Production, None) => return Err(ConfigError::Missing { name: "CORS_ORIGINS" }),
            (Env::Local, None) => Vec::new(),
        };

        let defaults = GuardConfig::default();
        let guard = GuardConfig {
            protected_prefixes: list_or("PROTECTED_PREFIXES", defaults.protected_prefixes),
            auth_only_prefixes: list_or("AUTH_ONLY_PREFIXES", defaults.auth_only_prefixes),
            login_path: var_or("LOGIN_PATH", &defaults.login_path),
            home_path: var_or("HOME_PATH", &defaults.home_path),
        };
        validate_guard(&guard)?;

        Ok(Self {
            env,
            bind_addr,
            auth_cookie: var_or("AUTH_COOKIE_NAME", DEFAULT_AUTH_COOKIE),
            static_dir: PathBuf::from(var_or("STATIC_DIR", DEFAULT_STATIC_DIR)),
            cors_origins,
            guard,
        })
    }
}

/// validate_guard
///
/// Prefix lists must be non-empty, every entry must look like a path, no
/// prefix may appear in both lists, and neither redirect target may itself
/// be redirected (login under a protected prefix, home under an auth-only
/// prefix).
pub fn validate_guard(guard: &GuardConfig) -> Result<(), ConfigError> {
    for (name, list) in [
        ("PROTECTED_PREFIXES", &guard.protected_prefixes),
        ("AUTH_ONLY_PREFIXES", &guard.auth_only_prefixes),
    ] {
        if list.is_empty() {
            return Err(ConfigError::EmptyPrefixList { name });
        }
        for prefix in list {
            require_path(name, prefix)?;
        }
    }
    require_path("LOGIN_PATH", &guard.login_path)?;
    require_path("HOME_PATH", &guard.home_path)?;

    if let Some(prefix) = guard
        .auth_only_prefixes
        .iter()
        .find(|prefix| guard.protected_prefixes.contains(*prefix))
    {
        return Err(ConfigError::OverlappingPrefix {
            prefix: prefix.clone(),
        });
    }

    for (name, path, prefixes) in [
        ("LOGIN_PATH", &guard.login_path, &guard.protected_prefixes),
        ("HOME_PATH", &guard.home_path, &guard.auth_only_prefixes),
    ] {
        if let Some(prefix) = prefixes.iter().find(|prefix| path.starts_with(prefix.as_str())) {
            return Err(ConfigError::RedirectLoop {
                name,
                path: path.clone(),
                prefix: prefix.clone(),
            });
        }
    }
    Ok(())
}

fn require_path(name: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with('/') {
        Ok(())
    } else {
        Err(ConfigError::NotAPath {
            name,
            value: value.to_string(),
        })
    }
}

// Blank and unset are the same thing for every variable: the default applies.

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn list_var(name: &str) -> Option<Vec<String>> {
    env::var(name)
        .ok()
        .map(|raw| split_list(&raw))
        .filter(|list| !list.is_empty())
}

fn list_or(name: &str, default: Vec<String>) -> Vec<String> {
    list_var(name).unwrap_or(default)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
