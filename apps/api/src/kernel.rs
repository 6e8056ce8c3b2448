use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use control_plane_container_engine::ContainerEngine;
use control_plane_db::Gateway;
use control_plane_lifecycle::LifecycleManager;
use control_plane_proxy::ProxyResolver;
use control_plane_subscriptions::SubscriptionProcessor;
use tracing::{error, info, instrument};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

/// Composition root: wires the database pool, the container engine, and
/// every domain manager into one `AppState`, then serves HTTP.
pub struct Kernel {
    port: u16,
    state: AppState,
}

impl Kernel {
    #[instrument(skip(config))]
    pub async fn ignite(config: Config) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let gateway = Gateway::connect(&config.database_url, config.database_max_connections).await?;

        let engine = ContainerEngine::connect(config.internal_network_name.clone())?;
        engine.ensure_network().await?;

        let lifecycle = LifecycleManager::new(gateway.clone(), engine.clone(), config.workspace_image.clone());
        let subscriptions = SubscriptionProcessor::new(gateway.clone(), lifecycle.clone(), config.webhook_secret.clone());
        let proxy = ProxyResolver::new(gateway.clone(), engine.clone());

        let state = AppState::new(gateway, engine, lifecycle, subscriptions, proxy, config.clone());

        info!("kernel ignited");
        Ok(Self { port: config.port, state })
    }

    /// Binds the listener and serves until the process is killed. There
    /// are no background daemons here — unlike the teacher, every
    /// recurring job this control plane needs (stop fan-out, ledger
    /// writes) runs as a one-shot task spawned from the request that
    /// triggers it, not a polling loop.
    pub async fn launch(self) -> anyhow::Result<()> {
        let router = build_router(self.state);
        let addr = SocketAddr::new(IpAddr::from([0, 0, 0, 0]), self.port);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "listening");

        if let Err(err) = axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>()).await {
            error!(error = %err, "server exited with an error");
            return Err(err.into());
        }
        Ok(())
    }
}
