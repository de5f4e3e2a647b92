use olympus_web::{AppConfig, AppState, create_router, models::HealthResponse};
use reqwest::{StatusCode, header, redirect::Policy};
use std::path::PathBuf;
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

async fn spawn_app() -> TestApp {
    let config = AppConfig {
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/site"),
        ..AppConfig::default()
    };
    let router = create_router(AppState::new(config));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    // Redirects are what we assert on, so never follow them.
    let client = reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap();

    TestApp { address, client }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");

    assert!(response.status().is_success());
    let body: HealthResponse = response.json().await.unwrap();
    assert_eq!(body.status, "ok");
}

#[tokio::test]
async fn test_sign_in_round_trip() {
    let app = spawn_app().await;

    // 1. Signed out: protected page bounces to login, remembering the target.
    let response = app
        .client
        .get(format!("{}/spaces/3f2a/threads", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let target = response.headers()[header::LOCATION].to_str().unwrap().to_string();
    assert_eq!(target, "/login?redirect=/spaces/3f2a/threads");

    // 2. The login page itself is served.
    let response = app
        .client
        .get(format!("{}{}", app.address, target))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 3. Signed in: the original page is served.
    let response = app
        .client
        .get(format!("{}/spaces/3f2a/threads", app.address))
        .header(header::COOKIE, "auth_token=token-value")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 4. Signed in: login bounces home.
    let response = app
        .client
        .get(format!("{}/login", app.address))
        .header(header::COOKIE, "auth_token=token-value")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/dashboard");
}

#[tokio::test]
async fn test_openapi_document_lists_endpoints() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(format!("{}/api-docs/openapi.json", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let doc: serde_json::Value = response.json().await.unwrap();
    for path in ["/health", "/api/route-policy", "/api/route-policy/evaluate", "/api/cache-policy"] {
        assert!(doc["paths"].get(path).is_some(), "missing {path}");
    }
}
