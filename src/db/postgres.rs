// PostgreSQL storage backend over the Diesel pool

use async_trait::async_trait;
use bb8::PooledConnection;
use chrono::Utc;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::instrument;
use uuid::Uuid;

use super::{DieselPool, HealthCheck, ProductRepository, StoreError, UserRepository};
use crate::models::{NewProduct, NewUser, Product, ProductChanges, User};

impl From<DieselError> for StoreError {
    fn from(error: DieselError) -> Self {
        match error {
            DieselError::NotFound => StoreError::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StoreError::Conflict(info.message().to_string())
            },
            other => StoreError::Database(other.to_string()),
        }
    }
}

pub struct PgStore {
    pool: DieselPool,
}

impl PgStore {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    async fn conn(
        &self,
    ) -> Result<PooledConnection<'_, AsyncDieselConnectionManager<AsyncPgConnection>>, StoreError>
    {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))
    }
}

#[async_trait]
impl UserRepository for PgStore {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut conn = self.conn().await?;
        Ok(User::create(&mut conn, user).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let mut conn = self.conn().await?;
        Ok(User::find_by_id(&mut conn, id).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.conn().await?;
        Ok(User::find_by_email(&mut conn, email).await?)
    }
}

#[async_trait]
impl ProductRepository for PgStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Product>, StoreError> {
        let mut conn = self.conn().await?;
        Ok(Product::list_for_user(&mut conn, user_id).await?)
    }

    #[instrument(skip(self, product), fields(user_id = %product.user_id))]
    async fn create(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut conn = self.conn().await?;
        Ok(Product::create(&mut conn, product).await?)
    }

    async fn find_for_user(&self, user_id: Uuid, id: i64) -> Result<Product, StoreError> {
        let mut conn = self.conn().await?;
        Ok(Product::find_for_user(&mut conn, user_id, id).await?)
    }

    #[instrument(skip(self, changes))]
    async fn update_for_user(
        &self,
        user_id: Uuid,
        id: i64,
        mut changes: ProductChanges,
    ) -> Result<Product, StoreError> {
        changes.updated_at = Some(Utc::now());
        let mut conn = self.conn().await?;
        Ok(Product::update_for_user(&mut conn, user_id, id, changes).await?)
    }

    #[instrument(skip(self))]
    async fn delete_for_user(&self, user_id: Uuid, id: i64) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        match Product::delete_for_user(&mut conn, user_id, id).await? {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl HealthCheck for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        diesel::sql_query("SELECT 1")
            .execute(&mut *conn)
            .await
            .map(|_| ())
            .map_err(StoreError::from)
    }
}
