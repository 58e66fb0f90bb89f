// Library exports for the blog API
// The binary in main.rs is a thin wrapper; tests drive the router built here

pub mod app;
pub mod app_config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use app::{AppState, StartupError};
pub use app_config::{AppConfig, ConfigError, Environment};
pub use db::{DieselPool, Storage, StoreError};
pub use middleware::{auth_middleware, AuthenticatedUser};
pub use models::auth::AccessTokenClaims;
pub use routes::{api_routes, build_router, RouteTable};
pub use services::{AuthProvider, JwtError, JwtService, ProductService, TokenAuthProvider};

use tracing::info;

/// Connect storage, apply migrations and wire the application state
pub async fn initialize_app_state(config: AppConfig) -> Result<AppState, StartupError> {
    let storage = Storage::connect(&config).await?;

    if migrations::should_run_migrations(&config) {
        info!("Running embedded migrations...");
        migrations::run_all_migrations(&config)
            .await
            .map_err(|e| StartupError::Migration(e.to_string()))?;
    }

    let state = AppState::new(config, storage)?;
    info!(
        routes = state.routes.len(),
        storage = state.storage.health.backend(),
        "Application state initialized"
    );
    Ok(state)
}
