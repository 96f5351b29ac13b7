use notif_relay::config::{
    avatar::AvatarConfig, database, server::ServerConfig, stream::StreamConfig,
};
use notif_relay::migration::Migrator;
use notif_relay::routes::create_app;
use notif_relay::services::{avatar::Gravatar, store::StorePool};
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let server = ServerConfig::from_env();
    let stream_config = StreamConfig::from_env();
    let avatar_config = AvatarConfig::from_env();

    tracing::info!("Starting notification relay v{}...", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        poll_interval_secs = stream_config.poll_interval.as_secs(),
        max_sessions = stream_config.max_sessions,
        heartbeat_secs = stream_config.heartbeat.map(|d| d.as_secs()),
        "Stream configuration"
    );

    let db = database::get_database().await?;
    tracing::info!("Database connected successfully");

    if server.run_migrations {
        Migrator::up(&db, None).await?;
        tracing::info!("Database migrations applied successfully");
    }

    let pool = StorePool::new(Arc::new(db), stream_config.max_sessions);
    let shutdown = CancellationToken::new();
    let app = create_app(
        pool,
        stream_config,
        Gravatar::shared(avatar_config),
        shutdown.clone(),
    );

    let addr = server.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown))
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "notif_relay=debug,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Waits for Ctrl-C, then ends every open stream so connections can drain.
async fn shutdown_signal(streams: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received, closing open streams...");
    streams.cancel();
}
