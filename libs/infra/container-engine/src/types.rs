use uuid::Uuid;

/// An opaque identifier returned by the container engine that names a
/// container. Callers must treat this as a handle, not a name — its
/// internal shape (a Docker container id) is not part of the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineHandle(pub String);

impl std::fmt::Display for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated inputs for creating a workspace container. Validation itself
/// (ranges, finiteness) happens in `control_plane_models::validation`
/// before a `ContainerSpec` is ever constructed; by the time this type
/// exists its fields are trusted.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub workspace_id: Uuid,
    pub image: String,
    pub network_name: String,
    pub cpu_quota: f64,
    pub memory_bytes: i64,
}

/// Docker's CPU period knob: the implementation targets 100ms periods, so
/// `cpu_quota_micros = cpu_quota * CPU_PERIOD_MICROS`.
pub const CPU_PERIOD_MICROS: i64 = 100_000;

/// Graceful container-stop timeout before the engine escalates to SIGKILL.
pub const DEFAULT_STOP_TIMEOUT_SECONDS: i64 = 30;
