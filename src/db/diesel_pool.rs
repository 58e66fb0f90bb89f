// Diesel Database Pool Configuration
// Diesel-async + bb8 connection pooling

use bb8::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations};
use std::time::Duration;

use super::StoreError;
use crate::app_config::DatabaseConfig;

// Embed migrations at compile time
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/diesel");

pub type DieselPool = Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// Create Diesel connection pool
pub async fn create_diesel_pool(config: &DatabaseConfig) -> Result<DieselPool, StoreError> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.url.clone());

    let pool = Pool::builder()
        .max_size(config.max_connections)
        .min_idle(Some(config.min_connections))
        .connection_timeout(Duration::from_secs(config.connect_timeout))
        .test_on_check_out(true)
        .build(manager)
        .await
        .map_err(|e| StoreError::Pool(e.to_string()))?;

    // Test the connection
    check_diesel_health(&pool).await?;

    tracing::info!(
        "Diesel pool initialized with {} max connections",
        config.max_connections
    );

    Ok(pool)
}

/// Health check for database pool
pub async fn check_diesel_health(pool: &DieselPool) -> Result<(), StoreError> {
    let conn = pool
        .get()
        .await
        .map_err(|e| StoreError::Pool(e.to_string()))?;

    // Getting a connection is enough; test_on_check_out already pinged it
    drop(conn);

    Ok(())
}

/// Mask database connection string for logging
pub fn mask_connection_string(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let scheme = parsed.scheme();
        let host = parsed.host_str().unwrap_or("***");
        let path = parsed.path();

        let normalized_scheme = if scheme == "postgres" {
            "postgresql"
        } else {
            scheme
        };

        if parsed.username().is_empty() && parsed.password().is_none() {
            format!("{}://{}{}", normalized_scheme, host, path)
        } else {
            format!("{}://***:***@{}{}", normalized_scheme, host, path)
        }
    } else {
        "postgresql://***:***@***".to_string()
    }
}
