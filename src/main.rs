use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

use ev_rental::config::{DatabaseConfig, EnvironmentConfig, StorageBackend};
use ev_rental::database::DatabaseConnection;
use ev_rental::repositories::{MemoryRentalStore, PgRentalStore, RentalStore, SeedData};
use ev_rental::routes::create_app_router;
use ev_rental::state::AppState;
use ev_rental::utils::time::SystemClock;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    let config = EnvironmentConfig::from_env().context("loading configuration")?;

    // Configure logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("⚡ EV Rental Engine");
    info!("================================================");
    if config.is_development() {
        warn!("🛠️  Running in development mode");
    }
    info!(
        "🕒 Operating zone {}, cancellation window {} min",
        config.operating_zone.offset(),
        config.cancellation_window.num_minutes()
    );

    let store = match open_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            error!("❌ Error opening the rental store: {:#}", e);
            return Err(e);
        }
    };

    let addr: SocketAddr = config
        .server_url()
        .parse()
        .with_context(|| format!("invalid listen address '{}'", config.server_url()))?;

    let app_state = AppState::new(config, store, Arc::new(SystemClock));
    let app = create_app_router(app_state);

    info!("🌐 Server starting on http://{}", addr);
    info!("🔍 Available endpoints:");
    info!("   GET  /health - Health check");
    info!("🚗 Vehicles:");
    info!("   GET  /api/vehicles/available - Vehicles the caller can book");
    info!("   GET  /api/vehicles/:id - Vehicle details");
    info!("📅 Rentals:");
    info!("   POST /api/rentals - Book a vehicle");
    info!("   GET  /api/rentals - Rental history");
    info!("   GET  /api/rentals/active - Active rental");
    info!("   POST /api/rentals/active/cancel - Cancel the active rental");
    info!("   POST /api/rentals/active/extend - Extend the active rental");
    info!("   POST /api/rentals/active/complete - Return the vehicle and bill");
    info!("💳 Billing:");
    info!("   POST /api/billing/estimate - Cost preview");
    info!("   GET  /api/billing/invoices - List invoices");
    info!("   POST /api/billing/invoices/:id/pay - Pay an invoice");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Server error: {}", e);
        return Err(e.into());
    }

    info!("👋 Server stopped");
    Ok(())
}

/// Open the configured storage backend
async fn open_store(config: &EnvironmentConfig) -> Result<Arc<dyn RentalStore>> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let connection = DatabaseConnection::connect(&db_config).await?;
            info!("✅ PostgreSQL store ready");
            Ok(Arc::new(PgRentalStore::new(connection.pool().clone())))
        }
        StorageBackend::Memory => {
            let seed = match &config.memory_seed_path {
                Some(path) => {
                    let raw = tokio::fs::read_to_string(path)
                        .await
                        .with_context(|| format!("reading seed file {}", path.display()))?;
                    serde_json::from_str::<SeedData>(&raw)
                        .with_context(|| format!("parsing seed file {}", path.display()))?
                }
                None => {
                    warn!("⚠️  In-memory store started without seed data");
                    SeedData::default()
                }
            };
            info!(
                "✅ In-memory store ready ({} memberships, {} users, {} vehicles)",
                seed.memberships.len(),
                seed.users.len(),
                seed.vehicles.len()
            );
            Ok(Arc::new(MemoryRentalStore::with_seed(seed)))
        }
    }
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Ctrl+C received, shutting down...");
        },
        _ = terminate => {
            info!("🛑 Termination signal received, shutting down...");
        },
    }
}
