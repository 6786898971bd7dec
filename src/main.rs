use clap::Parser;
use dotenvy::dotenv;
use rust_file_relay::config::RelayConfig;
use rust_file_relay::infrastructure::storage;
use rust_file_relay::{AppState, create_app};
use std::net::{IpAddr, SocketAddr};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the relay on
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port for the relay API
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rust_file_relay=info,tower_http=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    info!("🚀 Starting Rust File Relay...");

    let config = RelayConfig::from_env();
    info!(
        "🛡️  Relay Config: Max Size={}MB, List Page={}, Staging={}",
        config.max_file_size / 1024 / 1024,
        config.list_max_keys,
        config.staging_dir.display()
    );

    tokio::fs::create_dir_all(&config.staging_dir).await?;
    let storage_service = storage::setup_storage(&config).await?;

    let state = AppState::new(storage_service, config);

    let app = create_app(state);

    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("✅ Relay listening on: http://{}", addr);
    info!("📖 Swagger UI documentation: http://localhost:{}/swagger-ui", args.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Relay exited cleanly.");
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
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, initiating graceful shutdown...");
        },
    }
}
