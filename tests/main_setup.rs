use olympus_web::{
    AppConfig, GuardConfig,
    config::{ConfigError, Env, validate_guard},
};
use serial_test::serial;
use std::{env, panic};

const CONFIG_VARS: &[&str] = &[
    "APP_ENV",
    "BIND_ADDR",
    "AUTH_COOKIE_NAME",
    "STATIC_DIR",
    "CORS_ORIGINS",
    "PROTECTED_PREFIXES",
    "AUTH_ONLY_PREFIXES",
    "LOGIN_PATH",
    "HOME_PATH",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with exactly the given variables set (all other config
/// variables cleared), then restores the original environment.
fn run_with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(key, val);
            } else {
                env::remove_var(key);
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(&[], AppConfig::load).expect("local defaults load");

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(config.auth_cookie, "auth_token");
    assert!(config.cors_origins.is_empty());
    assert_eq!(config.guard, GuardConfig::default());
}

#[test]
#[serial]
fn test_app_config_production_requires_cors_origins() {
    let result = run_with_env(&[("APP_ENV", "production")], AppConfig::load);

    assert!(matches!(
        result,
        Err(ConfigError::Missing {
            name: "CORS_ORIGINS"
        })
    ));
}

#[test]
#[serial]
fn test_app_config_production_with_origins() {
    let config = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("CORS_ORIGINS", "https://app.olympus.dev, https://olympus.dev"),
            ("AUTH_COOKIE_NAME", "olympus_token"),
        ],
        AppConfig::load,
    )
    .expect("production config loads");

    assert_eq!(config.env, Env::Production);
    assert_eq!(
        config.cors_origins,
        vec!["https://app.olympus.dev", "https://olympus.dev"]
    );
    assert_eq!(config.auth_cookie, "olympus_token");
}

#[test]
#[serial]
fn test_app_config_prefix_overrides() {
    let config = run_with_env(
        &[
            ("PROTECTED_PREFIXES", "/dashboard,/threads"),
            ("AUTH_ONLY_PREFIXES", "/login"),
            ("LOGIN_PATH", "/login"),
            ("HOME_PATH", "/dashboard/home"),
        ],
        AppConfig::load,
    )
    .expect("overrides load");

    assert_eq!(config.guard.protected_prefixes, vec!["/dashboard", "/threads"]);
    assert_eq!(config.guard.auth_only_prefixes, vec!["/login"]);
    assert_eq!(config.guard.home_path, "/dashboard/home");
}

#[test]
#[serial]
fn test_app_config_rejects_bad_bind_addr() {
    let result = run_with_env(&[("BIND_ADDR", "not-an-address")], AppConfig::load);
    assert!(matches!(result, Err(ConfigError::BindAddr { .. })));
}

#[test]
#[serial]
fn test_app_config_rejects_relative_prefix() {
    let result = run_with_env(&[("PROTECTED_PREFIXES", "dashboard")], AppConfig::load);
    assert!(matches!(
        result,
        Err(ConfigError::NotAPath {
            name: "PROTECTED_PREFIXES",
            ..
        })
    ));
}

#[test]
fn test_validate_guard_rejects_shared_prefix() {
    let guard = GuardConfig {
        auth_only_prefixes: vec!["/login".into(), "/settings".into()],
        ..GuardConfig::default()
    };
    let err = validate_guard(&guard).unwrap_err();
    assert!(matches!(err, ConfigError::OverlappingPrefix { ref prefix } if prefix == "/settings"));
    assert_eq!(
        err.to_string(),
        "prefix \"/settings\" is both protected and auth-only"
    );
}

#[test]
fn test_validate_guard_rejects_empty_list() {
    let guard = GuardConfig {
        auth_only_prefixes: vec![],
        ..GuardConfig::default()
    };
    assert!(matches!(
        validate_guard(&guard),
        Err(ConfigError::EmptyPrefixList {
            name: "AUTH_ONLY_PREFIXES"
        })
    ));
}

#[test]
#[serial]
fn test_app_config_production_rejects_blank_cors_origins() {
    for blank in [" ", ",", " , "] {
        let result = run_with_env(
            &[("APP_ENV", "production"), ("CORS_ORIGINS", blank)],
            AppConfig::load,
        );
        assert!(
            matches!(
                result,
                Err(ConfigError::Missing {
                    name: "CORS_ORIGINS"
                })
            ),
            "CORS_ORIGINS={blank:?} should be rejected"
        );
    }
}

#[test]
#[serial]
fn test_app_config_blank_variables_fall_back_to_defaults() {
    let config = run_with_env(
        &[
            ("PROTECTED_PREFIXES", " "),
            ("AUTH_ONLY_PREFIXES", ","),
            ("LOGIN_PATH", " "),
            ("CORS_ORIGINS", ""),
        ],
        AppConfig::load,
    )
    .expect("blank variables use defaults");

    assert_eq!(config.guard, GuardConfig::default());
    assert!(config.cors_origins.is_empty());
}

#[test]
#[serial]
fn test_app_config_rejects_login_under_protected_prefix() {
    let result = run_with_env(&[("LOGIN_PATH", "/dashboard/login")], AppConfig::load);
    assert!(matches!(
        result,
        Err(ConfigError::RedirectLoop {
            name: "LOGIN_PATH",
            ..
        })
    ));
}

#[test]
fn test_validate_guard_rejects_home_under_auth_only_prefix() {
    let guard = GuardConfig {
        home_path: "/login/welcome".into(),
        ..GuardConfig::default()
    };
    let err = validate_guard(&guard).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::RedirectLoop { name: "HOME_PATH", ref prefix, .. } if prefix == "/login"
    ));
}
