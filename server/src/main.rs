//! Food delivery HTTP server: loads configuration from the environment (and `.env`),
//! prepares the database, and serves the API until Ctrl-C.

use food_delivery::{
    app,
    auth::TokenIssuer,
    cors_layer,
    ensure_database_exists,
    payment::StripeProcessor,
    AppConfig,
    AppState,
    PgStore,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("food_delivery=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    ensure_database_exists(config.database_url()).await?;
    let store = PgStore::connect(config.database_url(), config.database_max_connections).await?;
    store.ensure_schema().await?;

    let tokens = TokenIssuer::new(config.token_secret.clone(), config.token_ttl);
    let mut state = AppState::new(Arc::new(store), tokens);
    match &config.stripe {
        Some(stripe) => {
            let processor = StripeProcessor::new(
                stripe.secret_key.clone(),
                stripe.api_base.clone(),
                stripe.timeout,
            )?;
            state = state.with_payments(Arc::new(processor));
            tracing::info!(api_base = %stripe.api_base, "payment processor configured");
        }
        None => tracing::warn!("STRIPE_SECRET_KEY not set; payment intents will return 503"),
    }

    let router = app(state, cors_layer(&config.cors_allowed_origins));

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
