use relay_core::config::RelayAppConfig;
use relay_store::service::ApplicationBootstrap;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = RelayAppConfig::global();
    ApplicationBootstrap::run(config).await
}
