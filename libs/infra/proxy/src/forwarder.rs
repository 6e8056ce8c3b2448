use reqwest::header::{HeaderMap, HeaderName, HOST};
use reqwest::{Method, Response};

use crate::errors::ProxyError;
use crate::types::{UpstreamTarget, CREDENTIAL_HEADER_NAME};

/// Forwards one request to a resolved workspace. The credential header is
/// always stripped here too, even if the caller already dropped it, so
/// the invariant holds regardless of what the HTTP layer does.
pub async fn forward(
    client: &reqwest::Client,
    target: &UpstreamTarget,
    method: Method,
    rest_path_and_query: &str,
    mut headers: HeaderMap,
    body: reqwest::Body,
) -> Result<Response, ProxyError> {
    if let Ok(name) = HeaderName::try_from(CREDENTIAL_HEADER_NAME) {
        headers.remove(name);
    }
    headers.remove(HOST);

    let url = format!("{}{}", target.base_url, rest_path_and_query);
    client
        .request(method, url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| ProxyError::UpstreamUnreachable(e.to_string()))
}

/// Removes the `/api/proxy/{workspace_id}` prefix from a request path,
/// leaving `/` when nothing remains.
pub fn strip_proxy_prefix(full_path: &str, workspace_id: &str) -> String {
    let prefix = format!("/api/proxy/{workspace_id}");
    let rest = full_path.strip_prefix(&prefix).unwrap_or(full_path);
    if rest.is_empty() {
        "/".to_string()
    } else {
        rest.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_the_proxy_prefix() {
        assert_eq!(strip_proxy_prefix("/api/proxy/abc/status", "abc"), "/status");
        assert_eq!(strip_proxy_prefix("/api/proxy/abc", "abc"), "/");
        assert_eq!(strip_proxy_prefix("/api/proxy/abc/", "abc"), "/");
    }
}
