use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardmatch_api::auth_client::AuthClient;
use cardmatch_api::config::Config;
use cardmatch_api::db::Database;
use cardmatch_api::handlers::AppState;
use cardmatch_api::push_client::PushClient;
use cardmatch_api::{router, seed};

/// Main entry point for the application.
///
/// Initializes tracing, configuration, the database pool (running
/// migrations and the one-time catalog seed), and the external service
/// clients, then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardmatch_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Initialize database connection pool (runs migrations)
    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    // One-time catalog seed; no-op after first boot
    let seeded = seed::seed_credit_cards(&db.pool)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    if seeded > 0 {
        tracing::info!("Seeded {} catalog cards", seeded);
    }

    // Identity provider client for the authentication gate
    let auth_client = AuthClient::new(config.auth_base_url.clone())
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tracing::info!("Identity provider client initialized: {}", config.auth_base_url);

    // Push gateway client for application notifications
    let push_client = PushClient::new(config.push_gateway_url.clone())
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tracing::info!("Push gateway client initialized: {}", config.push_gateway_url);

    // Build application state
    let app_state = Arc::new(AppState {
        db: db.pool.clone(),
        config: config.clone(),
        auth_client,
        push_client,
    });

    let app = router::build(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
