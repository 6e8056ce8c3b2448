use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use serde_json::{json, Value};
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

/// Header the payment provider signs its webhook deliveries with.
const SIGNATURE_HEADER: &str = "x-webhook-signature";

pub struct WebhookHandler;

impl WebhookHandler {
    /// `provider` is part of the path so the route matches the external
    /// interface table, but every provider this control plane speaks to
    /// shares one signature scheme and one processor.
    #[instrument(skip(state, headers, body), fields(provider = %provider))]
    pub async fn receive(
        State(state): State<AppState>,
        Path(provider): Path<String>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<(StatusCode, axum::Json<Value>), ApiError> {
        let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

        state.subscriptions.process_webhook(&body, signature).await?;

        Ok((StatusCode::OK, axum::Json(json!({ "status": "ok" }))))
    }
}
