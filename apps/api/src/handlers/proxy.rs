use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::response::{IntoResponse, Response};
use control_plane_proxy::{forward, strip_proxy_prefix, CREDENTIAL_HEADER_NAME};
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

pub struct ProxyHandler;

impl ProxyHandler {
    /// The authenticated reverse proxy passthrough. Resolves the
    /// per-workspace credential to a live container, strips the
    /// `/api/proxy/{id}` prefix, and streams the request and response
    /// bodies through unbuffered in both directions.
    #[instrument(skip(state, req), fields(workspace_id = %workspace_id))]
    pub async fn forward(
        State(state): State<AppState>,
        Path((workspace_id, _rest)): Path<(String, String)>,
        req: Request,
    ) -> Result<Response, ApiError> {
        let credential = req
            .headers()
            .get(CREDENTIAL_HEADER_NAME)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::AuthRequired)?
            .to_string();

        let target = state.proxy.resolve(&credential).await?;

        let method = req.method().clone();
        let mut headers = req.headers().clone();
        headers.remove(CREDENTIAL_HEADER_NAME);

        let mut rest_path_and_query = strip_proxy_prefix(req.uri().path(), &workspace_id);
        if let Some(query) = req.uri().query() {
            rest_path_and_query = format!("{rest_path_and_query}?{query}");
        }

        let body_stream = req.into_body().into_data_stream();
        let upstream_body = reqwest::Body::wrap_stream(body_stream);

        let upstream_response = forward(
            &state.proxy_client,
            &target,
            method,
            &rest_path_and_query,
            headers,
            upstream_body,
        )
        .await?;

        let status = upstream_response.status();
        let response_headers = upstream_response.headers().clone();
        let response_body = Body::from_stream(upstream_response.bytes_stream());

        let mut response = Response::builder().status(status);
        if let Some(response_headers_mut) = response.headers_mut() {
            *response_headers_mut = response_headers;
        }

        response
            .body(response_body)
            .map(IntoResponse::into_response)
            .map_err(|e| ApiError::Internal(e.to_string()))
    }
}
