use anyhow::Context;
use clap::Parser;
use prometheus::Registry;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wg_exporter::{server, Collector, Config, DeviceQuery, PeerNames};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();

    if let Err(e) = run(config).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let query = config.query().context("cannot select device backend")?;

    let device = query
        .device(&config.device)
        .context("startup lookup failed")?;

    let names = PeerNames::sequential(&device, &config.peer_name_prefix);
    info!(
        "found device {} with {} peers",
        device.name,
        device.peers.len()
    );

    let collector = Collector::new(query, config.device.clone(), names)
        .context("failed to build collector")?;
    let registry = Registry::new();
    registry
        .register(Box::new(collector))
        .context("failed to register collector")?;

    let addrs = config.listen_addrs();
    let listener = server::bind(&addrs)
        .await
        .with_context(|| format!("cannot start WireGuard exporter on {:?}", config.metrics_addr))?;

    info!(
        "starting WireGuard exporter on {:?} via {:?} backend",
        config.metrics_addr, config.backend
    );
    let app = server::router(registry, &config.metrics_path);
    server::serve(listener, app, shutdown_signal())
        .await
        .context("WireGuard exporter stopped")?;

    info!("WireGuard exporter shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
