use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_CPU_QUOTA: f64 = f64::MIN_POSITIVE;
pub const MAX_CPU_QUOTA: f64 = 8.0;
pub const MIN_MEMORY_BYTES: i64 = 128 * 1024 * 1024;
pub const MAX_MEMORY_BYTES: i64 = 8 * 1024 * 1024 * 1024;
pub const MAX_WORKSPACE_NAME_LEN: usize = 100;

/// The workspace record's state, independent of whatever the container
/// engine currently reports for the backing container (it may not exist
/// yet, or may exist but be stopped while the record says `running` for a
/// few milliseconds mid-transition).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RuntimeState {
    Stopped,
    Creating,
    Running,
    Error,
}

impl RuntimeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeState::Stopped => "stopped",
            RuntimeState::Creating => "creating",
            RuntimeState::Running => "running",
            RuntimeState::Error => "error",
        }
    }
}

/// CPU and memory limits requested for a workspace's container.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResourceLimits {
    pub cpu_quota: f64,
    pub memory_bytes: i64,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            cpu_quota: 1.0,
            memory_bytes: 512 * 1024 * 1024,
        }
    }
}

/// A per-tenant isolated container plus its persisted configuration.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Workspace {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub engine_handle: Option<String>,
    pub runtime_state: RuntimeState,
    /// High-entropy secret used only to authenticate at the reverse proxy.
    /// Never forwarded upstream, never logged.
    pub proxy_credential: String,
    pub cpu_quota: f64,
    pub memory_bytes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_started_at: Option<DateTime<Utc>>,
}

/// `Workspace` without the proxy credential, for responses that list
/// workspaces rather than returning a single one the owner asked for by id.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceSummary {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub runtime_state: RuntimeState,
    pub cpu_quota: f64,
    pub memory_bytes: i64,
    pub created_at: DateTime<Utc>,
    pub last_started_at: Option<DateTime<Utc>>,
}

impl From<&Workspace> for WorkspaceSummary {
    fn from(w: &Workspace) -> Self {
        Self {
            id: w.id,
            owner_id: w.owner_id,
            name: w.name.clone(),
            runtime_state: w.runtime_state,
            cpu_quota: w.cpu_quota,
            memory_bytes: w.memory_bytes,
            created_at: w.created_at,
            last_started_at: w.last_started_at,
        }
    }
}
