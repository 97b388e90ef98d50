//! auction-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints, and
//! spawns the lifecycle sweeper.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use auction_gateway::api;
use auction_gateway::app_state::AppState;
use auction_gateway::config::GatewayConfig;
use auction_gateway::domain::{AuctionRegistry, EventBus};
use auction_gateway::notification::NotificationStore;
use auction_gateway::persistence::PostgresPersistence;
use auction_gateway::service::{AuctionService, EventFanout};
use auction_gateway::sweeper;
use auction_gateway::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting auction-gateway");

    // Build domain layer
    let registry = Arc::new(AuctionRegistry::new());
    let event_bus = EventBus::new(config.event_bus_capacity);
    let notifications = Arc::new(NotificationStore::new());

    // Optional persistence layer; a connection failure downgrades the
    // gateway to in-memory operation rather than aborting startup.
    let persistence = if config.persistence_enabled {
        connect_persistence(&config).await
    } else {
        tracing::info!("persistence disabled, running in-memory only");
        None
    };
    if let Some(persistence) = &persistence {
        hydrate_inboxes(persistence, &notifications).await;
    }

    // Build service layer
    let fanout = EventFanout::new(Arc::clone(&notifications), event_bus.clone(), persistence);
    let auction_service = Arc::new(AuctionService::new(registry, fanout));

    // Spawn the lifecycle sweeper
    let _sweeper = sweeper::spawn(
        Arc::clone(&auction_service),
        config.sweep_interval_secs,
        config.ending_soon_secs,
    );

    // Build application state
    let app_state = AppState {
        auction_service,
        notifications,
        event_bus,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Connects the Postgres pool and prepares the schema. Returns `None`
/// (with a warning) on any failure.
async fn connect_persistence(config: &GatewayConfig) -> Option<PostgresPersistence> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await;

    match pool {
        Ok(pool) => {
            let persistence = PostgresPersistence::new(pool);
            if let Err(e) = persistence.ensure_schema().await {
                tracing::warn!(error = %e, "schema setup failed, running in-memory only");
                return None;
            }
            tracing::info!("postgres persistence enabled");
            Some(persistence)
        }
        Err(e) => {
            tracing::warn!(error = %e, "postgres unavailable, running in-memory only");
            None
        }
    }
}

/// Rebuilds the in-memory inboxes from the Postgres mirror. Rows with
/// an unknown kind discriminator are skipped with a warning.
async fn hydrate_inboxes(persistence: &PostgresPersistence, store: &NotificationStore) {
    match persistence.load_notifications().await {
        Ok(rows) => {
            let total = rows.len();
            let entries: Vec<_> = rows
                .into_iter()
                .filter_map(|row| row.into_notification())
                .collect();
            if entries.len() < total {
                tracing::warn!(
                    skipped = total - entries.len(),
                    "skipped mirrored notifications with unknown kind"
                );
            }
            let restored = store.restore(entries).await;
            tracing::info!(restored, "restored notification inboxes from postgres");
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to restore inboxes, starting empty");
        }
    }
}
