use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use control_plane_container_engine::EngineError;
use control_plane_credentials::CredentialError;
use control_plane_db::DbError;
use control_plane_lifecycle::LifecycleError;
use control_plane_models::{RuntimeState, ValidationError};
use control_plane_proxy::ProxyError;
use control_plane_subscriptions::SubscriptionError;
use serde_json::{json, Value};
use thiserror::Error;

/// The single error type every handler returns. Each variant carries
/// exactly what the error envelope needs: an HTTP status, a machine-
/// readable kind, and a human message. Never carries a secret — the
/// per-crate errors it composes are already designed not to.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("authentication required")]
    AuthRequired,
    #[error("invalid credentials")]
    AuthFailed,
    #[error("no active entitlement")]
    Unentitled,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("owner has reached the workspace limit")]
    LimitReached,
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("workspace container is unreachable")]
    Unreachable,
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(String),
    #[error("workspace is not running")]
    NotRunning(RuntimeState),
    #[error("payment provider unreachable")]
    ProviderDown,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::LimitReached => StatusCode::BAD_REQUEST,
            ApiError::AuthRequired | ApiError::AuthFailed => StatusCode::UNAUTHORIZED,
            ApiError::Unentitled | ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            ApiError::Unreachable | ApiError::NotRunning(_) | ApiError::ProviderDown => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::AuthRequired => "auth_required",
            ApiError::AuthFailed => "auth_failed",
            ApiError::Unentitled => "unentitled",
            ApiError::Forbidden => "forbidden",
            ApiError::NotFound => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::LimitReached => "limit_reached",
            ApiError::RateLimited => "rate_limited",
            ApiError::Unreachable => "unreachable",
            ApiError::UpstreamUnreachable(_) => "upstream_unreachable",
            ApiError::NotRunning(_) => "not_running",
            ApiError::ProviderDown => "provider_down",
            ApiError::Internal(_) => "internal",
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            ApiError::Validation(reason) => Some(json!({ "reason": reason })),
            ApiError::NotRunning(state) => Some(json!({ "state": state.as_str() })),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status() == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "internal error");
        }

        let mut body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        if let Some(details) = self.details() {
            body["details"] = details;
        }

        (self.status(), Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Invalid => ApiError::AuthFailed,
            CredentialError::HashingBackend(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => ApiError::NotFound,
            DbError::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::NameConflict => ApiError::Conflict(err.to_string()),
            LifecycleError::LimitReached => ApiError::LimitReached,
            LifecycleError::Unentitled => ApiError::Unentitled,
            LifecycleError::InvalidLimits(e) => ApiError::Validation(e.to_string()),
            LifecycleError::NotFound => ApiError::NotFound,
            LifecycleError::Engine(e) => ApiError::Internal(e.to_string()),
            LifecycleError::Db(e) => e.into(),
        }
    }
}

impl From<SubscriptionError> for ApiError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::InvalidSignature => ApiError::AuthFailed,
            SubscriptionError::MalformedPayload(msg) => ApiError::Internal(msg),
            SubscriptionError::Db(e) => e.into(),
        }
    }
}

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::AuthRequired => ApiError::AuthRequired,
            ProxyError::AuthFailed => ApiError::AuthFailed,
            ProxyError::Unentitled => ApiError::Unentitled,
            ProxyError::NotRunning(state) => ApiError::NotRunning(state),
            ProxyError::Unreachable => ApiError::Unreachable,
            ProxyError::UpstreamUnreachable(msg) => ApiError::UpstreamUnreachable(msg),
            ProxyError::Db(e) => e.into(),
            ProxyError::Engine(e) => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_reached_maps_to_400() {
        assert_eq!(ApiError::LimitReached.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_running_maps_to_503_and_carries_the_current_state() {
        let err = ApiError::NotRunning(RuntimeState::Creating);
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.details(), Some(json!({ "state": "creating" })));
    }

    #[test]
    fn unreachable_maps_to_503_distinct_from_upstream_unreachable() {
        assert_eq!(ApiError::Unreachable.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ApiError::UpstreamUnreachable("connect timed out".to_string()).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn conflict_carries_the_source_message() {
        let err = ApiError::Conflict("a workspace with this name already exists".to_string());
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.kind(), "conflict");
    }
}
