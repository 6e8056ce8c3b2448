mod common;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use control_plane_api::prelude::build_router;
use control_plane_credentials::TokenSigner;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use common::test_state;

fn peer() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 54321)
}

/// `Router::oneshot` bypasses `into_make_service_with_connect_info`, so
/// tests insert the `ConnectInfo` extension the rate-limit middleware
/// expects by hand.
fn request(method: &str, uri: &str, bearer: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let mut req = builder.body(body).unwrap();
    req.extensions_mut().insert(ConnectInfo(peer()));
    req
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[sqlx::test(migrations = "../../libs/infra/db/migrations")]
async fn missing_bearer_token_yields_auth_required(pool: PgPool) {
    let state = test_state(pool);
    let router = build_router(state);

    let response = router
        .oneshot(request("GET", "/api/workspaces", None, Body::empty()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "auth_required");
}

#[sqlx::test(migrations = "../../libs/infra/db/migrations")]
async fn malformed_bearer_token_yields_auth_failed(pool: PgPool) {
    let state = test_state(pool);
    let router = build_router(state);

    let response = router
        .oneshot(request("GET", "/api/workspaces", Some("not-a-real-token"), Body::empty()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "auth_failed");
}

#[sqlx::test(migrations = "../../libs/infra/db/migrations")]
async fn valid_token_lists_an_empty_workspace_set_for_a_fresh_user(pool: PgPool) {
    let state = test_state(pool);
    let signer = TokenSigner::new(state.config.bearer_secret.clone(), state.config.bearer_ttl_seconds);
    let (token, _) = signer.issue(Uuid::new_v4());
    let router = build_router(state);

    let response = router
        .oneshot(request("GET", "/api/workspaces", Some(&token.0), Body::empty()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["workspaces"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../../libs/infra/db/migrations")]
async fn proxy_without_a_credential_header_yields_auth_required(pool: PgPool) {
    let state = test_state(pool);
    let router = build_router(state);

    let response = router
        .oneshot(request(
            "GET",
            "/api/proxy/00000000-0000-0000-0000-000000000000/health",
            None,
            Body::empty(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "auth_required");
}

#[sqlx::test(migrations = "../../libs/infra/db/migrations")]
async fn health_check_reports_the_database_as_up(pool: PgPool) {
    let state = test_state(pool);
    let router = build_router(state);

    let response = router.oneshot(request("GET", "/health", None, Body::empty())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
}
