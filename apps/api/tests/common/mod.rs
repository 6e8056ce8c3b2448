#![allow(dead_code)]

use std::sync::Arc;

use control_plane_api::prelude::{AppState, Config};
use control_plane_container_engine::ContainerEngine;
use control_plane_db::Gateway;
use control_plane_lifecycle::LifecycleManager;
use control_plane_proxy::ProxyResolver;
use control_plane_subscriptions::SubscriptionProcessor;
use sqlx::PgPool;

pub const WEBHOOK_SECRET: &[u8] = b"test-webhook-secret";

pub fn test_config() -> Config {
    Config {
        port: 0,
        database_url: String::new(),
        database_max_connections: 5,

        bearer_secret: b"test-bearer-secret-at-least-32-bytes-long".to_vec(),
        bearer_ttl_seconds: 3600,

        argon2_memory_kib: 19 * 1024,
        argon2_iterations: 2,

        payment_provider_key_id: "test_provider".to_string(),
        payment_provider_secret: "test_provider_secret".to_string(),
        webhook_secret: WEBHOOK_SECRET.to_vec(),
        plan_ids: vec!["starter".to_string(), "pro".to_string()],

        frontend_origin: "http://localhost:5173".to_string(),
        internal_network_name: "control-plane-workspaces-test".to_string(),
        workspace_image: control_plane_lifecycle::DEFAULT_WORKSPACE_IMAGE.to_string(),

        default_cpu_quota: 1.0,
        default_memory_bytes: 512 * 1024 * 1024,

        rate_limit_auth_burst: 5,
        rate_limit_auth_period_secs: 900,
        rate_limit_api_burst: 100,
        rate_limit_api_period_secs: 900,
        rate_limit_lifecycle_burst: 10,
        rate_limit_lifecycle_period_secs: 300,
    }
}

/// Wires a full `AppState` around an already-migrated test pool handed out
/// by `#[sqlx::test]`. `ContainerEngine::connect` never dials the daemon
/// (see its doc comment), so none of this requires Docker to be running —
/// only tests that actually start or stop a workspace would hit that wall.
pub fn test_state(pool: PgPool) -> AppState {
    let config = Arc::new(test_config());
    let gateway = Gateway::from_pool(pool);
    let engine = ContainerEngine::connect(config.internal_network_name.clone())
        .expect("lazy docker client construction never fails");
    let lifecycle = LifecycleManager::new(gateway.clone(), engine.clone(), config.workspace_image.clone());
    let subscriptions = SubscriptionProcessor::new(gateway.clone(), lifecycle.clone(), config.webhook_secret.clone());
    let proxy = ProxyResolver::new(gateway.clone(), engine.clone());
    AppState::new(gateway, engine, lifecycle, subscriptions, proxy, config)
}

pub fn sign(secret: &[u8], body: &[u8]) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;
    let mut mac = Hmac::<Sha256>::new_from_slice(secret).unwrap();
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}
