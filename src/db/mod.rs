// Storage layer
// Repository traits with an in-memory and a PostgreSQL implementation

pub mod diesel_pool;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::app_config::AppConfig;
use crate::models::{NewProduct, NewUser, Product, ProductChanges, User};

pub use diesel_pool::{check_diesel_health, create_diesel_pool, mask_connection_string, DieselPool};
pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection pool error: {0}")]
    Pool(String),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; a taken email is a `Conflict`
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Case-insensitive lookup
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

/// Product access is always scoped to an owner; another user's product is
/// `NotFound`, never a distinct error.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Product>, StoreError>;

    async fn create(&self, product: NewProduct) -> Result<Product, StoreError>;

    async fn find_for_user(&self, user_id: Uuid, id: i64) -> Result<Product, StoreError>;

    async fn update_for_user(
        &self,
        user_id: Uuid,
        id: i64,
        changes: ProductChanges,
    ) -> Result<Product, StoreError>;

    async fn delete_for_user(&self, user_id: Uuid, id: i64) -> Result<(), StoreError>;
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Handles to the repositories the application runs against
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub health: Arc<dyn HealthCheck>,
}

impl Storage {
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            products: store.clone(),
            health: store,
        }
    }

    pub fn postgres(pool: DieselPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            users: store.clone(),
            products: store.clone(),
            health: store,
        }
    }

    /// PostgreSQL when a database is configured, otherwise in-memory
    pub async fn connect(config: &AppConfig) -> Result<Self, StoreError> {
        match &config.database {
            Some(database) => {
                info!(
                    "Connecting to PostgreSQL at {}",
                    mask_connection_string(&database.url)
                );
                let pool = create_diesel_pool(database).await?;
                Ok(Self::postgres(pool))
            },
            None => {
                info!("DATABASE_URL not set, using in-memory storage");
                Ok(Self::in_memory())
            },
        }
    }
}
