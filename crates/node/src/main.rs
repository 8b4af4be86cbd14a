use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::info;

use chq_node::{
    Api, ChainMetaProtocol, Config, ConfigRegistry, HermesProtocol, StoreChainState, CLI
};
use chq_storage::SqliteStore;


fn main() -> anyhow::Result<()> {
    let args = CLI::parse();

    let env_filter = tracing_subscriber::EnvFilter::builder().parse_lossy(
        std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV)
            .unwrap_or("info".to_string()),
    );

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .compact()
        .init();

    let config = Config::read(&args.config).with_context(|| {
        format!("failed to read config from '{}'", args.config)
    })?;

    let store = Arc::new(
        SqliteStore::open(&args.database).context("failed to open database")?
    );

    let chain = Arc::new(StoreChainState::new(store.clone()));
    let registry = Arc::new(ConfigRegistry::new(config.protocols.clone()));

    let chain_meta = Arc::new(ChainMetaProtocol::new(store.clone(), chain, registry));
    let hermes = Arc::new(HermesProtocol::new(store, config.hermes.clone()));

    let api = Api::new(chain_meta, hermes, config.tps_window);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let app = api.build_router();

            let listener = tokio::net::TcpListener::bind(&config.listen).await?;
            info!("listening on {}", config.listen);

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            Ok::<(), anyhow::Error>(())
        })?;

    Ok(())
}


async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {}
    }
}
