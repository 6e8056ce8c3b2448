use control_plane_container_engine::{ContainerEngine, ContainerSpec, EngineHandle};
use control_plane_credentials::generate_proxy_credential;
use control_plane_db::{Gateway, NewWorkspace, WorkspaceRepository};
use control_plane_models::{validation, RuntimeState, Workspace};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::errors::LifecycleError;
use crate::types::MAX_WORKSPACES_PER_OWNER;

/// Owns the workspace record's state machine. Independent of whatever the
/// container engine currently reports: the record may say `running` for a
/// few milliseconds while the underlying container is still starting.
#[derive(Clone)]
pub struct LifecycleManager {
    gateway: Gateway,
    engine: ContainerEngine,
    workspace_image: String,
}

impl LifecycleManager {
    pub fn new(gateway: Gateway, engine: ContainerEngine, workspace_image: impl Into<String>) -> Self {
        Self {
            gateway,
            engine,
            workspace_image: workspace_image.into(),
        }
    }

    #[instrument(skip(self))]
    pub async fn create_workspace(
        &self,
        owner_id: Uuid,
        name: &str,
        cpu_quota: f64,
        memory_bytes: i64,
        entitled: bool,
    ) -> Result<Workspace, LifecycleError> {
        if !entitled {
            return Err(LifecycleError::Unentitled);
        }
        validation::validate_workspace_name(name)?;
        validation::validate_cpu_quota(cpu_quota)?;
        validation::validate_memory_bytes(memory_bytes)?;

        let mut tx = self.gateway.begin().await?;

        let existing = WorkspaceRepository::count_by_owner(&mut *tx, owner_id).await?;
        if existing >= MAX_WORKSPACES_PER_OWNER {
            return Err(LifecycleError::LimitReached);
        }

        let proxy_credential = generate_proxy_credential();
        let workspace = WorkspaceRepository::insert(
            &mut *tx,
            NewWorkspace {
                id: Uuid::new_v4(),
                owner_id,
                name,
                proxy_credential: &proxy_credential,
                cpu_quota,
                memory_bytes,
            },
        )
        .await
        .map_err(|e| match e {
            control_plane_db::DbError::Conflict(_) => LifecycleError::NameConflict,
            other => LifecycleError::Db(other),
        })?;

        tx.commit().await.map_err(control_plane_db::DbError::Query)?;
        info!(workspace_id = %workspace.id, %owner_id, "workspace created");
        Ok(workspace)
    }

    /// Idempotent: starting an already-running workspace is a no-op
    /// success. If the backing container doesn't exist yet, it is created
    /// first.
    #[instrument(skip(self))]
    pub async fn start(&self, workspace_id: Uuid, entitled: bool) -> Result<Workspace, LifecycleError> {
        if !entitled {
            return Err(LifecycleError::Unentitled);
        }

        let mut tx = self.gateway.begin().await?;
        let workspace = WorkspaceRepository::find_by_id_for_update(&mut *tx, workspace_id)
            .await?
            .ok_or(LifecycleError::NotFound)?;

        if workspace.runtime_state == RuntimeState::Running {
            tx.commit().await.map_err(control_plane_db::DbError::Query)?;
            return Ok(workspace);
        }

        let handle = match &workspace.engine_handle {
            Some(id) => EngineHandle(id.clone()),
            None => {
                WorkspaceRepository::update_runtime_state(
                    &mut *tx,
                    workspace_id,
                    RuntimeState::Creating,
                    None,
                )
                .await?;

                let spec = ContainerSpec {
                    workspace_id,
                    image: self.workspace_image.clone(),
                    network_name: self.engine.network_name().to_string(),
                    cpu_quota: workspace.cpu_quota,
                    memory_bytes: workspace.memory_bytes,
                };
                let handle = match self.engine.create_workspace_container(&spec).await {
                    Ok(handle) => handle,
                    Err(err) => {
                        WorkspaceRepository::update_runtime_state(
                            &mut *tx,
                            workspace_id,
                            RuntimeState::Error,
                            None,
                        )
                        .await?;
                        tx.commit().await.map_err(control_plane_db::DbError::Query)?;
                        error!(%workspace_id, error = %err, "failed to create workspace container");
                        return Err(LifecycleError::Engine(err));
                    }
                };

                WorkspaceRepository::update_runtime_state(
                    &mut *tx,
                    workspace_id,
                    RuntimeState::Stopped,
                    Some(&handle.0),
                )
                .await?;
                handle
            }
        };

        if let Err(err) = self.engine.start(&handle).await {
            WorkspaceRepository::update_runtime_state(
                &mut *tx,
                workspace_id,
                RuntimeState::Error,
                Some(&handle.0),
            )
            .await?;
            tx.commit().await.map_err(control_plane_db::DbError::Query)?;
            error!(%workspace_id, error = %err, "failed to start workspace container");
            return Err(LifecycleError::Engine(err));
        }

        let workspace = WorkspaceRepository::update_runtime_state(
            &mut *tx,
            workspace_id,
            RuntimeState::Running,
            Some(&handle.0),
        )
        .await?;
        tx.commit().await.map_err(control_plane_db::DbError::Query)?;
        info!(%workspace_id, "workspace started");
        Ok(workspace)
    }

    /// Idempotent: stopping an already-stopped workspace is a no-op
    /// success.
    #[instrument(skip(self))]
    pub async fn stop(&self, workspace_id: Uuid, entitled: bool) -> Result<Workspace, LifecycleError> {
        if !entitled {
            return Err(LifecycleError::Unentitled);
        }

        let mut tx = self.gateway.begin().await?;
        let workspace = WorkspaceRepository::find_by_id_for_update(&mut *tx, workspace_id)
            .await?
            .ok_or(LifecycleError::NotFound)?;

        if workspace.runtime_state == RuntimeState::Stopped {
            tx.commit().await.map_err(control_plane_db::DbError::Query)?;
            return Ok(workspace);
        }

        if let Some(handle) = &workspace.engine_handle {
            if let Err(err) = self.engine.stop(&EngineHandle(handle.clone())).await {
                WorkspaceRepository::update_runtime_state(
                    &mut *tx,
                    workspace_id,
                    RuntimeState::Error,
                    Some(handle),
                )
                .await?;
                tx.commit().await.map_err(control_plane_db::DbError::Query)?;
                error!(%workspace_id, error = %err, "failed to stop workspace container");
                return Err(LifecycleError::Engine(err));
            }
        }

        let workspace = WorkspaceRepository::update_runtime_state(
            &mut *tx,
            workspace_id,
            RuntimeState::Stopped,
            None,
        )
        .await?;
        tx.commit().await.map_err(control_plane_db::DbError::Query)?;
        info!(%workspace_id, "workspace stopped");
        Ok(workspace)
    }

    /// Force-removes any backing container, then deletes the record.
    /// Succeeds even if the container is already absent. Does not require
    /// entitlement: an owner must always be able to tear down a workspace,
    /// entitled or not.
    #[instrument(skip(self))]
    pub async fn delete(&self, workspace_id: Uuid) -> Result<(), LifecycleError> {
        let mut tx = self.gateway.begin().await?;
        let workspace = WorkspaceRepository::find_by_id_for_update(&mut *tx, workspace_id)
            .await?
            .ok_or(LifecycleError::NotFound)?;

        if let Some(handle) = &workspace.engine_handle {
            if let Err(err) = self.engine.remove(&EngineHandle(handle.clone())).await {
                warn!(%workspace_id, error = %err, "failed to remove backing container, deleting record anyway");
            }
        }

        WorkspaceRepository::delete(&mut *tx, workspace_id).await?;
        tx.commit().await.map_err(control_plane_db::DbError::Query)?;
        info!(%workspace_id, "workspace deleted");
        Ok(())
    }
}
