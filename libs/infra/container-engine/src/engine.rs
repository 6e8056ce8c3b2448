use std::collections::HashMap;

use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, RemoveContainerOptions,
    StartContainerOptions, StopContainerOptions,
};
use bollard::errors::Error as BollardError;
use bollard::network::{CreateNetworkOptions, InspectNetworkOptions};
use bollard::service::{HostConfig, RestartPolicy, RestartPolicyNameEnum};
use bollard::Docker;
use tracing::{debug, info, instrument, warn};

use crate::errors::EngineError;
use crate::types::{ContainerSpec, EngineHandle, CPU_PERIOD_MICROS, DEFAULT_STOP_TIMEOUT_SECONDS};

/// Typed wrapper over the local container daemon. Every operation here is
/// idempotent where the base spec calls for idempotence: starting a
/// running container, stopping a stopped one, and removing an absent one
/// are all successes, not errors.
///
/// **Invariant enforced at this layer**: no operation may publish a host
/// port or attach a container to any network other than the internal one
/// named at construction time.
#[derive(Clone)]
pub struct ContainerEngine {
    docker: Docker,
    network_name: String,
}

impl ContainerEngine {
    pub fn connect(network_name: impl Into<String>) -> Result<Self, EngineError> {
        let docker = Docker::connect_with_local_defaults().map_err(EngineError::from)?;
        Ok(Self {
            docker,
            network_name: network_name.into(),
        })
    }

    pub fn network_name(&self) -> &str {
        &self.network_name
    }

    /// Idempotently creates the internal bridge network used by all
    /// workspace containers. No host port publications ever happen on it.
    #[instrument(skip(self))]
    pub async fn ensure_network(&self) -> Result<(), EngineError> {
        let inspected = self
            .docker
            .inspect_network(
                &self.network_name,
                Some(InspectNetworkOptions::<String> {
                    verbose: false,
                    scope: None,
                }),
            )
            .await;

        match inspected {
            Ok(_) => {
                debug!(network = %self.network_name, "internal network already exists");
                Ok(())
            }
            Err(BollardError::DockerResponseServerError {
                status_code: 404, ..
            }) => {
                info!(network = %self.network_name, "creating internal bridge network");
                self.docker
                    .create_network(CreateNetworkOptions {
                        name: self.network_name.clone(),
                        driver: "bridge".to_string(),
                        internal: true,
                        ..Default::default()
                    })
                    .await
                    .map_err(EngineError::from)?;
                Ok(())
            }
            Err(other) => Err(EngineError::from(other)),
        }
    }

    /// Creates (but does not start) a workspace container with no port
    /// bindings, a CPU quota expressed against a 100ms period, a hard
    /// memory-plus-swap limit equal to the memory limit (swap disabled), a
    /// minimal capability set, and `no-new-privileges`.
    #[instrument(skip(self, spec), fields(workspace_id = %spec.workspace_id))]
    pub async fn create_workspace_container(
        &self,
        spec: &ContainerSpec,
    ) -> Result<EngineHandle, EngineError> {
        if spec.cpu_quota <= 0.0 || spec.memory_bytes <= 0 {
            return Err(EngineError::InvalidLimits);
        }

        let hostname = format!("workspace-{}", spec.workspace_id);
        let cpu_quota_micros = (spec.cpu_quota * CPU_PERIOD_MICROS as f64).round() as i64;

        let host_config = HostConfig {
            cpu_period: Some(CPU_PERIOD_MICROS),
            cpu_quota: Some(cpu_quota_micros),
            memory: Some(spec.memory_bytes),
            memory_swap: Some(spec.memory_bytes),
            cap_drop: Some(vec!["ALL".to_string()]),
            cap_add: Some(vec!["NET_BIND_SERVICE".to_string()]),
            security_opt: Some(vec!["no-new-privileges".to_string()]),
            network_mode: Some(spec.network_name.clone()),
            restart_policy: Some(RestartPolicy {
                name: Some(RestartPolicyNameEnum::NO),
                maximum_retry_count: None,
            }),
            port_bindings: None,
            publish_all_ports: Some(false),
            ..Default::default()
        };

        let config = Config {
            image: Some(spec.image.clone()),
            hostname: Some(hostname.clone()),
            env: Some(vec![format!("WORKSPACE_ID={}", spec.workspace_id)]),
            host_config: Some(host_config),
            ..Default::default()
        };

        let container_name = format!("workspace-{}", spec.workspace_id);
        let response = self
            .docker
            .create_container(
                Some(CreateContainerOptions {
                    name: container_name,
                    platform: None,
                }),
                config,
            )
            .await
            .map_err(EngineError::from)?;

        info!(container_id = %response.id, "workspace container created");
        Ok(EngineHandle(response.id))
    }

    /// Starts a container; starting an already-running container succeeds.
    #[instrument(skip(self))]
    pub async fn start(&self, handle: &EngineHandle) -> Result<(), EngineError> {
        match self
            .docker
            .start_container(&handle.0, None::<StartContainerOptions<String>>)
            .await
        {
            Ok(()) => Ok(()),
            Err(BollardError::DockerResponseServerError {
                status_code: 304, ..
            }) => Ok(()),
            Err(other) => Err(EngineError::from(other)),
        }
    }

    /// Stops a container with a graceful timeout; stopping an
    /// already-stopped container succeeds.
    #[instrument(skip(self))]
    pub async fn stop(&self, handle: &EngineHandle) -> Result<(), EngineError> {
        self.stop_with_timeout(handle, DEFAULT_STOP_TIMEOUT_SECONDS)
            .await
    }

    pub async fn stop_with_timeout(
        &self,
        handle: &EngineHandle,
        timeout_seconds: i64,
    ) -> Result<(), EngineError> {
        match self
            .docker
            .stop_container(&handle.0, Some(StopContainerOptions { t: timeout_seconds }))
            .await
        {
            Ok(()) => Ok(()),
            Err(BollardError::DockerResponseServerError {
                status_code: 304, ..
            }) => Ok(()),
            Err(other) => Err(EngineError::from(other)),
        }
    }

    /// Force-removes a container; removing an absent container succeeds.
    #[instrument(skip(self))]
    pub async fn remove(&self, handle: &EngineHandle) -> Result<(), EngineError> {
        match self
            .docker
            .remove_container(
                &handle.0,
                Some(RemoveContainerOptions {
                    force: true,
                    v: true,
                    ..Default::default()
                }),
            )
            .await
        {
            Ok(()) => Ok(()),
            Err(BollardError::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(()),
            Err(other) => Err(EngineError::from(other)),
        }
    }

    /// Returns the container's address on the internal network, or `None`
    /// if the container is absent or not yet attached.
    #[instrument(skip(self))]
    pub async fn ip_on_internal_network(
        &self,
        handle: &EngineHandle,
    ) -> Result<Option<String>, EngineError> {
        let inspected = match self
            .docker
            .inspect_container(&handle.0, None::<InspectContainerOptions>)
            .await
        {
            Ok(inspected) => inspected,
            Err(BollardError::DockerResponseServerError {
                status_code: 404, ..
            }) => return Ok(None),
            Err(other) => return Err(EngineError::from(other)),
        };

        let networks: HashMap<String, _> = inspected
            .network_settings
            .and_then(|settings| settings.networks)
            .unwrap_or_default();

        let ip = networks
            .get(&self.network_name)
            .and_then(|endpoint| endpoint.ip_address.clone())
            .filter(|ip| !ip.is_empty());

        if ip.is_none() {
            warn!(handle = %handle, "container has no address on the internal network yet");
        }

        Ok(ip)
    }
}
