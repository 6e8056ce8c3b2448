use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::middleware;
use axum::routing::{any, delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::auth::AuthHandler;
use crate::handlers::health::HealthHandler;
use crate::handlers::payments::PaymentsHandler;
use crate::handlers::proxy::ProxyHandler;
use crate::handlers::webhook::WebhookHandler;
use crate::handlers::workspaces::WorkspaceHandler;
use crate::middleware::{api_rate_limit, auth_rate_limit, bearer_auth, lifecycle_rate_limit};
use crate::state::AppState;

const MAX_JSON_BODY_BYTES: usize = 1024 * 1024;

/// Builds the full router. Per-group `route_layer` calls apply in reverse
/// of call order — the layer added last runs first — so every private
/// group adds `bearer_auth` before its rate-limit tier: the limiter sees
/// every request, authenticated or not, and the 401/429 precedence stays
/// "limit first, then auth" regardless of how the group is composed.
///
/// `workspaces_write` is the deliberate exception: its rate limit is keyed
/// by owner id (spec: lifecycle operations are rate-limited per owner, not
/// per IP), so it has no key to check until `bearer_auth` has run. There
/// the order is reversed — `bearer_auth` is added last so it runs first —
/// and the precedence flips to "auth first, then limit" for this one group.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .frontend_origin
                .parse::<HeaderValue>()
                .expect("FRONTEND_ORIGIN must be a valid header value"),
        )
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let auth_public = Router::new()
        .route("/api/auth/register", post(AuthHandler::register))
        .route("/api/auth/login", post(AuthHandler::login))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_rate_limit));

    let auth_private = Router::new()
        .route("/api/auth/me", get(AuthHandler::me))
        .route("/api/auth/logout", post(AuthHandler::logout))
        .route_layer(middleware::from_fn_with_state(state.clone(), bearer_auth))
        .route_layer(middleware::from_fn_with_state(state.clone(), api_rate_limit));

    let workspaces_read = Router::new()
        .route("/api/workspaces", get(WorkspaceHandler::list))
        .route("/api/workspaces/:id", get(WorkspaceHandler::get))
        .route_layer(middleware::from_fn_with_state(state.clone(), bearer_auth))
        .route_layer(middleware::from_fn_with_state(state.clone(), api_rate_limit));

    let workspaces_write = Router::new()
        .route("/api/workspaces", post(WorkspaceHandler::create))
        .route("/api/workspaces/:id/start", post(WorkspaceHandler::start))
        .route("/api/workspaces/:id/stop", post(WorkspaceHandler::stop))
        .route("/api/workspaces/:id", delete(WorkspaceHandler::delete))
        // Reversed from the other groups: this limiter is keyed by owner id,
        // so bearer_auth must run first to populate it. Added last here so
        // it ends up outermost and runs before lifecycle_rate_limit.
        .route_layer(middleware::from_fn_with_state(state.clone(), lifecycle_rate_limit))
        .route_layer(middleware::from_fn_with_state(state.clone(), bearer_auth));

    let payments = Router::new()
        .route("/api/payments/checkout", post(PaymentsHandler::checkout))
        .route("/api/payments/subscription", get(PaymentsHandler::get_subscription))
        .route("/api/payments/cancel", post(PaymentsHandler::cancel))
        .route_layer(middleware::from_fn_with_state(state.clone(), bearer_auth))
        .route_layer(middleware::from_fn_with_state(state.clone(), api_rate_limit));

    // Every control-plane-owned route that accepts a JSON body gets a hard
    // size cap. The proxy passthrough is excluded below: it forwards
    // arbitrary workspace traffic and has no business imposing our limit.
    let json_api = auth_public
        .merge(auth_private)
        .merge(workspaces_read)
        .merge(workspaces_write)
        .merge(payments)
        .layer(RequestBodyLimitLayer::new(MAX_JSON_BODY_BYTES));

    // Webhook deliveries are unauthenticated (verified by signature, not
    // bearer token) and unrate-limited, per the external interface table.
    let webhooks = Router::new().route("/api/webhooks/:provider", post(WebhookHandler::receive));

    // The reverse proxy authenticates via its own per-workspace credential
    // header, resolved and checked inside `ProxyResolver::resolve` rather
    // than through `bearer_auth` or any of the three IP-keyed tiers.
    let proxy = Router::new().route("/api/proxy/:workspace_id/*rest", any(ProxyHandler::forward));

    let health = Router::new().route("/health", get(HealthHandler::check));

    Router::new()
        .merge(health)
        .merge(json_api)
        .merge(webhooks)
        .merge(proxy)
        .layer(cors)
        .with_state(state)
}
