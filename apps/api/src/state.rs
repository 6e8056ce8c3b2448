use std::sync::Arc;
use std::time::Duration;

use control_plane_container_engine::ContainerEngine;
use control_plane_credentials::TokenSigner;
use control_plane_db::Gateway;
use control_plane_lifecycle::LifecycleManager;
use control_plane_proxy::ProxyResolver;
use control_plane_subscriptions::SubscriptionProcessor;

use crate::config::Config;
use crate::rate_limit::{self, IpRateLimiter, OwnerRateLimiter};

/// Everything a handler needs, cloned cheaply per request. Managers and
/// repositories are `Clone` over an inner `Arc`/pool already, so this
/// struct itself stays flat rather than wrapping every field in its own
/// `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
    pub engine: ContainerEngine,
    pub lifecycle: LifecycleManager,
    pub subscriptions: SubscriptionProcessor,
    pub proxy: ProxyResolver,
    pub proxy_client: reqwest::Client,
    pub tokens: TokenSigner,
    pub config: Arc<Config>,
    pub auth_limiter: Arc<IpRateLimiter>,
    pub api_limiter: Arc<IpRateLimiter>,
    /// Keyed by owner id, not caller IP — see the ordering note on the
    /// `workspaces_write` router in `routes.rs`.
    pub lifecycle_limiter: Arc<OwnerRateLimiter>,
}

impl AppState {
    pub fn new(
        gateway: Gateway,
        engine: ContainerEngine,
        lifecycle: LifecycleManager,
        subscriptions: SubscriptionProcessor,
        proxy: ProxyResolver,
        config: Arc<Config>,
    ) -> Self {
        let tokens = TokenSigner::new(config.bearer_secret.clone(), config.bearer_ttl_seconds);

        let auth_limiter = Arc::new(rate_limit::build(
            config.rate_limit_auth_burst,
            Duration::from_secs(config.rate_limit_auth_period_secs),
        ));
        let api_limiter = Arc::new(rate_limit::build(
            config.rate_limit_api_burst,
            Duration::from_secs(config.rate_limit_api_period_secs),
        ));
        let lifecycle_limiter = Arc::new(rate_limit::build(
            config.rate_limit_lifecycle_burst,
            Duration::from_secs(config.rate_limit_lifecycle_period_secs),
        ));

        Self {
            gateway,
            engine,
            lifecycle,
            subscriptions,
            proxy,
            proxy_client: reqwest::Client::new(),
            tokens,
            config,
            auth_limiter,
            api_limiter,
            lifecycle_limiter,
        }
    }
}
