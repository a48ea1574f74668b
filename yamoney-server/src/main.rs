//! Yandex.Money notification server
//!
//! Receives the provider's `checkOrder` and `paymentAviso` callbacks, keeps
//! payment records up to date and fires the payment signals.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::{ConfigLoader, get_database_url};
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use yamoney_core::events::{PaymentEventReceiver, payment_event_channel};
use yamoney_core::signals::PaymentSignals;
use yamoney_core::store::{MemoryPaymentStore, PaymentStore, PgPaymentStore};

/// Yandex.Money payment notification endpoint
#[derive(Parser, Debug)]
#[command(name = "yamoney-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./yamoney-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,

    /// Keep payments in memory instead of PostgreSQL (records are lost on exit)
    #[arg(long, default_value = "false", conflicts_with = "migrate")]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting yamoney-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = loaded_config.server.listen;
    let prefix = loaded_config.server.prefix.clone();
    tracing::info!("Configuration loaded from {:?}", args.config);

    let shared_config = loaded_config.into_shared();

    // Choose the payment store
    let (store, db_pool): (Arc<dyn PaymentStore>, Option<PgPool>) = if args.in_memory {
        tracing::warn!("Using in-memory payment store; records will not survive a restart");
        (Arc::new(MemoryPaymentStore::new()), None)
    } else {
        let db_pool = connect_database(args.migrate).await?;
        (Arc::new(PgPaymentStore::new(db_pool.clone())), Some(db_pool))
    };

    // Wire the payment signals to the event log
    let (event_tx, event_rx) = payment_event_channel();
    let mut signals = PaymentSignals::default();
    signals.forward_to(event_tx);
    let event_task = tokio::spawn(log_payment_events(event_rx));

    let state = AppState::new(shared_config, store, Arc::new(signals));

    // Spawn config reload handler (listens for SIGHUP)
    let shutdown_notify = spawn_config_reload_handler(state.clone(), config_loader);

    let router = build_router(state, &prefix);

    tracing::info!(
        "Starting HTTP server on {} (notification routes under {:?})",
        listen_addr,
        if prefix.is_empty() { "/" } else { prefix.as_str() }
    );
    let result = run_server(router, listen_addr).await;

    // Signal the config reload handler to stop
    shutdown_notify.notify_one();
    // The logger exits once the last state clone (and its senders) is dropped.
    match tokio::time::timeout(Duration::from_secs(5), event_task).await {
        Ok(Err(e)) => tracing::warn!("Payment event logger ended abnormally: {}", e),
        Err(_) => tracing::warn!("Payment event logger did not drain in time"),
        Ok(Ok(())) => {}
    }

    if let Some(db_pool) = db_pool {
        tracing::info!("Closing database connections...");
        db_pool.close().await;
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Connect to PostgreSQL using `DATABASE_URL`, optionally running migrations.
async fn connect_database(migrate: bool) -> anyhow::Result<PgPool> {
    let database_url = get_database_url().map_err(|e| {
        tracing::error!("DATABASE_URL environment variable not set");
        e
    })?;

    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    if migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&db_pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                e
            })?;
        tracing::info!("Migrations completed successfully");
    }

    Ok(db_pool)
}

/// Log every forwarded payment signal until all senders are gone.
async fn log_payment_events(mut events: PaymentEventReceiver) {
    while let Some(event) = events.recv().await {
        tracing::info!(
            signal = %event.kind,
            payment_id = event.payment_id,
            shop_id = event.shop_id,
            order_number = %event.order_number,
            status = %event.status,
            "Payment signal"
        );
    }
    tracing::debug!("Payment event channel closed");
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
