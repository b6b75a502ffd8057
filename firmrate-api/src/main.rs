//! # firmrate API Server
//!
//! JSON API for the company-review service: registered users submit star
//! ratings and text reviews for companies, administrators moderate
//! submissions before they become public, and users can edit or withdraw
//! their own reviews within a grace window.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p firmrate-api
//! ```

use firmrate_api::{
    app::{build_router, AppState},
    config::Config,
};
use firmrate_shared::db::{migrations, pool};
use firmrate_shared::mail::SmtpMailer;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "firmrate_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "firmrate API server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    migrations::ensure_database_exists(&config.database.url).await?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;
    migrations::ensure_anonymous_user(&db, config.app.anonymous_user_id).await?;

    let mailer = Arc::new(SmtpMailer::new(config.mail_config())?);

    let bind_address = config.bind_address();
    let state = AppState::new(db, config, mailer)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, exiting...");
        })
        .await?;

    Ok(())
}
