/// Router-level tests for the authentication gate and ownership binding.
/// The database pool is lazy and never connects: every request here must be
/// rejected (or answered) before any store access.
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cardmatch_api::auth_client::AuthClient;
use cardmatch_api::config::Config;
use cardmatch_api::db::Database;
use cardmatch_api::handlers::AppState;
use cardmatch_api::push_client::PushClient;
use cardmatch_api::router;

/// App wired to a mock identity provider and an unreachable database.
async fn test_app(auth_server: &MockServer) -> axum::Router {
    let config = Config {
        database_url: "postgresql://unreachable.invalid/cardmatch".to_string(),
        port: 0,
        auth_base_url: auth_server.uri(),
        push_gateway_url: "http://push.invalid/send".to_string(),
    };

    let db = Database::connect_lazy(&config.database_url).unwrap();
    let auth_client = AuthClient::new(config.auth_base_url.clone()).unwrap();
    let push_client = PushClient::new(config.push_gateway_url.clone()).unwrap();

    router::build(Arc::new(AppState {
        db: db.pool,
        config,
        auth_client,
        push_client,
    }))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn mock_verified_subject(sub: &str) -> Mock {
    Mock::given(method("GET"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "sub": sub })))
}

#[tokio::test]
async fn health_bypasses_the_gate() {
    let auth_server = MockServer::start().await;
    let app = test_app(&auth_server).await;

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_authorization_header_is_rejected() {
    let auth_server = MockServer::start().await;
    let app = test_app(&auth_server).await;

    let response = app
        .oneshot(Request::get("/api/cards").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn garbled_authorization_header_is_rejected() {
    let auth_server = MockServer::start().await;
    let app = test_app(&auth_server).await;

    let response = app
        .oneshot(
            Request::get("/api/cards")
                .header("Authorization", "Token abcdef")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn provider_rejected_token_is_rejected() {
    let auth_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&auth_server)
        .await;
    let app = test_app(&auth_server).await;

    let response = app
        .oneshot(
            Request::get("/api/recommendations/uid-1")
                .header("Authorization", "Bearer expired")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn callers_cannot_read_another_users_profile() {
    let auth_server = MockServer::start().await;
    mock_verified_subject("uid-1").mount(&auth_server).await;
    let app = test_app(&auth_server).await;

    let response = app
        .oneshot(
            Request::get("/api/users/uid-2")
                .header("Authorization", "Bearer good")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn application_body_user_must_match_caller() {
    let auth_server = MockServer::start().await;
    mock_verified_subject("uid-1").mount(&auth_server).await;
    let app = test_app(&auth_server).await;

    let body = serde_json::json!({
        "userId": "uid-2",
        "creditCardId": "7f1c1f60-64a3-4f3e-9f9d-1f2a3b4c5d6e"
    });
    let response = app
        .oneshot(
            Request::post("/api/applications")
                .header("Authorization", "Bearer good")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn read_flag_cannot_transition_to_false() {
    let auth_server = MockServer::start().await;
    mock_verified_subject("uid-1").mount(&auth_server).await;
    let app = test_app(&auth_server).await;

    let response = app
        .oneshot(
            Request::put("/api/notifications/7f1c1f60-64a3-4f3e-9f9d-1f2a3b4c5d6e")
                .header("Authorization", "Bearer good")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"read": false}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}
