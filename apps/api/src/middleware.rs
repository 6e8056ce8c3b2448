use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Extension, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use control_plane_db::UserRepository;
use uuid::Uuid;

use crate::error::ApiError;
use crate::rate_limit::KeyedRateLimiter;
use crate::state::AppState;

/// The caller's id, injected into request extensions by [`bearer_auth`].
/// Handlers that need the authenticated user pull this out with axum's
/// `Extension` extractor rather than re-verifying the token themselves.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Uuid);

/// Verifies the `Authorization: Bearer <token>` header and injects
/// [`AuthenticatedUser`]. Every failure mode — missing header, malformed
/// header, bad signature, expired token, unknown user — collapses to the
/// same `AuthFailed`/`AuthRequired` pair so a caller can't probe which one
/// it hit.
pub async fn bearer_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::AuthRequired)?;

    let claims = state.tokens.verify(token).map_err(|_| ApiError::AuthFailed)?;

    // A valid signature only proves the token was never tampered with, not
    // that the user it names still exists — a deleted account's token stays
    // cryptographically valid until it expires. Confirm the user is still
    // on file so a deleted account loses access immediately, not just in the
    // `me` endpoint that happens to look the row up anyway.
    UserRepository::find_by_id(state.gateway.pool(), claims.user_id)
        .await?
        .ok_or(ApiError::AuthFailed)?;

    req.extensions_mut().insert(AuthenticatedUser(claims.user_id));
    Ok(next.run(req).await)
}

async fn check_rate_limit<K: std::hash::Hash + Eq + Clone>(
    limiter: &KeyedRateLimiter<K>,
    key: K,
) -> Result<(), ApiError> {
    limiter.check_key(&key).map_err(|_| ApiError::RateLimited)
}

/// Tier for `/api/auth/*`: tight, since this is where credential-guessing
/// would show up first.
pub async fn auth_rate_limit(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    check_rate_limit(&state.auth_limiter, addr.ip()).await?;
    Ok(next.run(req).await)
}

/// Tier for the general authenticated API surface (workspaces read path,
/// payments).
pub async fn api_rate_limit(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    check_rate_limit(&state.api_limiter, addr.ip()).await?;
    Ok(next.run(req).await)
}

/// Tighter tier for workspace create/start/stop, which each provoke a
/// container-engine round trip. Keyed by owner rather than caller IP —
/// unlike the other two tiers, this one runs only once `bearer_auth` has
/// populated [`AuthenticatedUser`], since there is no owner to key on
/// before then. See the route_layer ordering note in `routes.rs`.
pub async fn lifecycle_rate_limit(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    check_rate_limit(&state.lifecycle_limiter, user_id).await?;
    Ok(next.run(req).await)
}
