use argon2::Params;
use axum::extract::{Extension, State};
use axum::Json;
use control_plane_credentials::{hash_password_with_params, verify_password};
use control_plane_db::UserRepository;
use control_plane_models::user::UserPublic;
use control_plane_models::validation::{validate_email, validate_password};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
struct UserResponse {
    user: UserPublic,
}

pub struct AuthHandler;

impl AuthHandler {
    #[instrument(skip(state, body))]
    pub async fn register(
        State(state): State<AppState>,
        Json(body): Json<RegisterRequest>,
    ) -> Result<(axum::http::StatusCode, Json<UserResponse>), ApiError> {
        validate_email(&body.email)?;
        validate_password(&body.password)?;

        let params = Params::new(state.config.argon2_memory_kib, state.config.argon2_iterations, 1, None)
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        let digest = hash_password_with_params(&body.password, params)?;

        let user = UserRepository::insert(state.gateway.pool(), Uuid::new_v4(), &body.email, &digest).await?;

        Ok((
            axum::http::StatusCode::CREATED,
            Json(UserResponse {
                user: UserPublic::from(&user),
            }),
        ))
    }

    #[instrument(skip(state, body))]
    pub async fn login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> Result<Json<Value>, ApiError> {
        let user = UserRepository::find_by_email(state.gateway.pool(), &body.email)
            .await?
            .ok_or(ApiError::AuthFailed)?;

        verify_password(&body.password, &user.password_digest).map_err(|_| ApiError::AuthFailed)?;

        let (token, claims) = state.tokens.issue(user.id);
        let expires_in = (claims.expires_at - claims.issued_at).num_seconds();

        Ok(Json(json!({
            "token": token.0,
            "expires_in": expires_in,
            "user": UserPublic::from(&user),
        })))
    }

    #[instrument(skip(state))]
    pub async fn me(
        State(state): State<AppState>,
        Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    ) -> Result<Json<UserResponse>, ApiError> {
        let user = UserRepository::find_by_id(state.gateway.pool(), user_id)
            .await?
            .ok_or(ApiError::NotFound)?;
        Ok(Json(UserResponse {
            user: UserPublic::from(&user),
        }))
    }

    /// Bearer tokens are stateless (HMAC-signed, self-expiring) — there is
    /// no server-side session to revoke. The client discards the token;
    /// this endpoint exists so the API surface matches the external
    /// interface table and so a future revocation list has a home.
    #[instrument]
    pub async fn logout() -> Json<Value> {
        Json(json!({ "message": "logged out" }))
    }
}
