/// Header the proxy reads the per-workspace credential from. Stripped
/// before any request is forwarded upstream.
pub const CREDENTIAL_HEADER_NAME: &str = "x-workspace-credential";

/// Port the workspace runtime listens on inside its container.
pub const WORKSPACE_CONTAINER_PORT: u16 = 8080;

/// An upstream target resolved for a single request. Never cached: built
/// fresh every time from the workspace's current container IP.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    pub base_url: String,
}

/// Returns a safe-to-log prefix of a credential, for the "log only a
/// prefix" requirement on failed-authentication attempts.
pub fn credential_prefix(credential: &str) -> &str {
    let end = credential.char_indices().nth(8).map(|(i, _)| i).unwrap_or(credential.len());
    &credential[..end]
}
