/// Maximum number of workspaces a single owner may hold at once.
pub const MAX_WORKSPACES_PER_OWNER: i64 = 3;

/// Fallback image reference when no override is configured.
pub const DEFAULT_WORKSPACE_IMAGE: &str = "control-plane/workspace-runtime:latest";
