// Application state shared across handlers
use std::sync::Arc;

use thiserror::Error;

use crate::{
    app_config::AppConfig,
    db::{Storage, StoreError},
    middleware::throttle::ApiThrottle,
    routes::{api_routes, RouteTable, RouteTableError},
    services::{AuthProvider, JwtConfig, JwtService, ProductService, TokenAuthProvider},
    utils::password::PasswordConfig,
};

/// Anything that can abort startup before the server binds
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Route table error: {0}")]
    Routes(#[from] RouteTableError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Migration failed: {0}")]
    Migration(String),
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub routes: Arc<RouteTable>,
    pub auth: Arc<dyn AuthProvider>,
    pub products: Arc<ProductService>,
    pub storage: Storage,
    /// None when API_RATE_LIMIT_PER_MINUTE is 0
    pub throttle: Option<Arc<ApiThrottle>>,
}

impl AppState {
    /// Wire services over an already connected storage backend
    pub fn new(config: AppConfig, storage: Storage) -> Result<Self, RouteTableError> {
        let routes = Arc::new(api_routes(&config.api_prefix)?);

        let jwt = Arc::new(JwtService::new(JwtConfig::from_app_config(&config.jwt)));
        let auth: Arc<dyn AuthProvider> = Arc::new(TokenAuthProvider::new(
            jwt,
            storage.users.clone(),
            PasswordConfig::from(&config.security),
        ));
        let products = Arc::new(ProductService::new(
            storage.products.clone(),
            routes.clone(),
        ));
        let throttle = ApiThrottle::per_minute(config.security.api_rate_limit_per_minute).map(Arc::new);

        Ok(Self {
            config: Arc::new(config),
            routes,
            auth,
            products,
            storage,
            throttle,
        })
    }
}
