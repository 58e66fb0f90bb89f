// Migration orchestrator
// Embedded in the application binary; runs at startup against PostgreSQL

pub mod diesel;

use crate::app_config::AppConfig;
use std::error::Error;
use tracing::{error, info};

/// Whether startup should apply migrations: a database must be configured and
/// DISABLE_EMBEDDED_MIGRATIONS must not be set
pub fn should_run_migrations(config: &AppConfig) -> bool {
    config.database.is_some() && !config.disable_embedded_migrations
}

/// Apply pending migrations when `should_run_migrations` allows it
pub async fn run_all_migrations(config: &AppConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let database = match &config.database {
        Some(database) if should_run_migrations(config) => database,
        _ => {
            info!("[MIGRATIONS] Skipping migrations");
            return Ok(());
        },
    };

    info!(
        "[MIGRATIONS] Starting migration process for environment: {}",
        config.server.environment
    );

    match diesel::run_migrations(&database.url).await {
        Ok(0) => info!("[MIGRATIONS] Diesel migrations up to date"),
        Ok(applied) => info!("[MIGRATIONS] Applied {} Diesel migrations", applied),
        Err(e) => {
            error!("[MIGRATIONS] Diesel migration failed: {}", e);
            return Err(format!("Diesel migration failed: {}", e).into());
        },
    }

    Ok(())
}
