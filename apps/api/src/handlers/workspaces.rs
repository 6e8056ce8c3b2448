use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use control_plane_db::{SubscriptionRepository, WorkspaceRepository};
use control_plane_models::workspace::WorkspaceSummary;
use control_plane_models::Workspace;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    #[serde(rename = "cpuLimit")]
    pub cpu_limit: Option<f64>,
    #[serde(rename = "memoryLimit")]
    pub memory_limit: Option<i64>,
}

#[derive(Serialize)]
struct WorkspaceListResponse {
    workspaces: Vec<WorkspaceSummary>,
    count: usize,
}

#[derive(Serialize)]
struct WorkspaceResponse {
    workspace: Workspace,
}

/// Whether `user_id` currently holds an active, unexpired subscription.
/// The single gate both workspace creation/start/stop and the reverse
/// proxy check.
async fn is_entitled(state: &AppState, user_id: Uuid) -> Result<bool, ApiError> {
    let entitled = SubscriptionRepository::find_current_for_user(state.gateway.pool(), user_id)
        .await?
        .is_some_and(|sub| sub.is_entitled(Utc::now()));
    Ok(entitled)
}

/// Loads a workspace and confirms `user_id` owns it. A non-owner gets the
/// same `NotFound` a nonexistent id would, so the endpoint never confirms
/// another tenant's workspace exists.
async fn load_owned(state: &AppState, workspace_id: Uuid, user_id: Uuid) -> Result<Workspace, ApiError> {
    let workspace = WorkspaceRepository::find_by_id(state.gateway.pool(), workspace_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    if workspace.owner_id != user_id {
        return Err(ApiError::NotFound);
    }
    Ok(workspace)
}

pub struct WorkspaceHandler;

impl WorkspaceHandler {
    #[instrument(skip(state))]
    pub async fn list(
        State(state): State<AppState>,
        Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    ) -> Result<Json<WorkspaceListResponse>, ApiError> {
        let workspaces = WorkspaceRepository::list_by_owner(state.gateway.pool(), user_id).await?;
        let summaries: Vec<WorkspaceSummary> = workspaces.iter().map(WorkspaceSummary::from).collect();
        Ok(Json(WorkspaceListResponse {
            count: summaries.len(),
            workspaces: summaries,
        }))
    }

    #[instrument(skip(state))]
    pub async fn get(
        State(state): State<AppState>,
        Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
        Path(workspace_id): Path<Uuid>,
    ) -> Result<Json<WorkspaceResponse>, ApiError> {
        let workspace = load_owned(&state, workspace_id, user_id).await?;
        Ok(Json(WorkspaceResponse { workspace }))
    }

    #[instrument(skip(state, body))]
    pub async fn create(
        State(state): State<AppState>,
        Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
        Json(body): Json<CreateWorkspaceRequest>,
    ) -> Result<(StatusCode, Json<WorkspaceResponse>), ApiError> {
        let entitled = is_entitled(&state, user_id).await?;
        let cpu_quota = body.cpu_limit.unwrap_or(state.config.default_cpu_quota);
        let memory_bytes = body.memory_limit.unwrap_or(state.config.default_memory_bytes);

        let workspace = state
            .lifecycle
            .create_workspace(user_id, &body.name, cpu_quota, memory_bytes, entitled)
            .await?;

        Ok((StatusCode::CREATED, Json(WorkspaceResponse { workspace })))
    }

    #[instrument(skip(state))]
    pub async fn start(
        State(state): State<AppState>,
        Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
        Path(workspace_id): Path<Uuid>,
    ) -> Result<Json<WorkspaceResponse>, ApiError> {
        load_owned(&state, workspace_id, user_id).await?;
        let entitled = is_entitled(&state, user_id).await?;
        let workspace = state.lifecycle.start(workspace_id, entitled).await?;
        Ok(Json(WorkspaceResponse { workspace }))
    }

    #[instrument(skip(state))]
    pub async fn stop(
        State(state): State<AppState>,
        Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
        Path(workspace_id): Path<Uuid>,
    ) -> Result<Json<WorkspaceResponse>, ApiError> {
        load_owned(&state, workspace_id, user_id).await?;
        let entitled = is_entitled(&state, user_id).await?;
        let workspace = state.lifecycle.stop(workspace_id, entitled).await?;
        Ok(Json(WorkspaceResponse { workspace }))
    }

    #[instrument(skip(state))]
    pub async fn delete(
        State(state): State<AppState>,
        Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
        Path(workspace_id): Path<Uuid>,
    ) -> Result<StatusCode, ApiError> {
        load_owned(&state, workspace_id, user_id).await?;
        state.lifecycle.delete(workspace_id).await?;
        Ok(StatusCode::NO_CONTENT)
    }
}
