use shellgate::assets::AssetStore;
use shellgate::config::Config;
use shellgate::router::Router;
use shellgate::server::{EdgeServer, PKG_NAME, VERSION};
use shellgate::static_dir::DirAssetStore;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("shellgate=debug".parse().expect("valid log directive")),
        )
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path.display(), error = %e, "Failed to load configuration");
        e
    })?;

    info!(path = %config_path.display(), "Configuration loaded");

    print_startup_banner(&config);

    let dir_store = DirAssetStore::new(&config.assets.dir);
    if !dir_store.root().is_dir() {
        warn!(
            dir = %dir_store.root().display(),
            "Asset directory does not exist yet; admin requests will fail until it does"
        );
    }

    let bind_addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port)
        .parse()
        .map_err(|e| {
            error!(
                bind = %config.server.bind,
                port = config.server.port,
                error = %e,
                "Invalid bind address"
            );
            anyhow::anyhow!("Invalid bind address: {}", e)
        })?;

    let router = Arc::new(Router::new(config.routes.clone())?);
    let store: Arc<dyn AssetStore> = Arc::new(dir_store);

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let server = EdgeServer::new(bind_addr, router, store, shutdown_rx);
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!(error = %e, "Edge server error");
        }
    });

    // Wait for shutdown signal (Ctrl+C or SIGTERM)
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received SIGINT (Ctrl+C), shutting down...");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl+C, shutting down...");
    }

    // Signal shutdown
    let _ = shutdown_tx.send(true);

    // Wait for the server to stop (with timeout)
    if tokio::time::timeout(Duration::from_secs(5), server_handle)
        .await
        .is_err()
    {
        warn!("Edge server did not stop within 5 seconds");
    }

    info!("Shutdown complete");
    Ok(())
}

fn print_startup_banner(config: &Config) {
    info!(name = PKG_NAME, version = VERSION, "Starting edge router");
    info!(
        bind = %config.server.bind,
        port = config.server.port,
        "Server configuration"
    );
    info!(
        health_path = %config.routes.health_path,
        admin_prefix = %config.routes.admin_prefix,
        index_document = %config.routes.index_document,
        redirect_target = %config.routes.redirect_target(),
        "Routes"
    );
    info!(dir = %config.assets.dir, "Asset store: bundle directory");
}
