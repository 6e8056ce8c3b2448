use control_plane_api::prelude::{Config, Kernel};
use tracing::error;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    control_plane_observability::init_tracing("control_plane_api");

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    runtime.block_on(async {
        let config = Config::from_env()?;
        let kernel = Kernel::ignite(config).await?;
        if let Err(err) = kernel.launch().await {
            error!(error = %err, "fatal error");
            std::process::exit(1);
        }
        Ok(())
    })
}
