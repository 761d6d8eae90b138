//! Database migration command.
//!
//! Applies the platform's migrations. The sessions table is managed
//! separately by the server at startup via the session store.

use secrecy::ExposeSecret;
use sqlx::PgPool;

use super::CliError;

/// Run the platform database migrations.
pub async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let database_url = super::database_url()?;

    tracing::info!("Connecting to platform database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running platform migrations...");
    sqlx::migrate!("../platform/migrations").run(&pool).await?;

    tracing::info!("Platform migrations complete!");
    Ok(())
}
