use control_plane_container_engine::{ContainerEngine, EngineHandle};
use control_plane_db::{Gateway, SubscriptionRepository, WorkspaceRepository};
use control_plane_models::RuntimeState;
use tracing::warn;

use crate::errors::ProxyError;
use crate::types::{credential_prefix, UpstreamTarget, WORKSPACE_CONTAINER_PORT};

/// Resolves a per-workspace credential into a live upstream target,
/// running every check the base spec requires before a byte of the
/// request is forwarded: credential validity, entitlement, runtime state,
/// and reachability.
#[derive(Clone)]
pub struct ProxyResolver {
    gateway: Gateway,
    engine: ContainerEngine,
}

impl ProxyResolver {
    pub fn new(gateway: Gateway, engine: ContainerEngine) -> Self {
        Self { gateway, engine }
    }

    pub async fn resolve(&self, credential: &str) -> Result<UpstreamTarget, ProxyError> {
        let workspace = WorkspaceRepository::find_by_proxy_credential(self.gateway.pool(), credential)
            .await?
            .ok_or_else(|| {
                warn!(credential_prefix = %credential_prefix(credential), "proxy credential not recognized");
                ProxyError::AuthFailed
            })?;

        let entitled = SubscriptionRepository::find_current_for_user(self.gateway.pool(), workspace.owner_id)
            .await?
            .is_some_and(|sub| sub.is_entitled(chrono::Utc::now()));
        if !entitled {
            return Err(ProxyError::Unentitled);
        }

        if workspace.runtime_state != RuntimeState::Running {
            return Err(ProxyError::NotRunning(workspace.runtime_state));
        }
        let Some(handle) = workspace.engine_handle else {
            return Err(ProxyError::NotRunning(workspace.runtime_state));
        };

        let ip = self
            .engine
            .ip_on_internal_network(&EngineHandle(handle))
            .await?
            .ok_or(ProxyError::Unreachable)?;

        Ok(UpstreamTarget {
            base_url: format!("http://{ip}:{WORKSPACE_CONTAINER_PORT}"),
        })
    }
}
