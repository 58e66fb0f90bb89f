// In-memory storage backend
// Used when no database is configured and by the test suite

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{HealthCheck, ProductRepository, StoreError, UserRepository};
use crate::models::{NewProduct, NewUser, Product, ProductChanges, User};

#[derive(Default)]
struct UserTable {
    by_id: HashMap<Uuid, User>,
    /// Lower-cased email to id
    by_email: HashMap<String, Uuid>,
}

pub struct InMemoryStore {
    users: RwLock<UserTable>,
    products: RwLock<BTreeMap<i64, Product>>,
    next_product_id: AtomicI64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(UserTable::default()),
            products: RwLock::new(BTreeMap::new()),
            next_product_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let email = user.email.to_lowercase();
        let mut table = self.users.write().await;

        // Checked under the write lock so concurrent registrations cannot both win
        if table.by_email.contains_key(&email) {
            return Err(StoreError::Conflict(format!("email {} is taken", email)));
        }

        let now = Utc::now();
        let record = User {
            id: user.id,
            name: user.name,
            email: email.clone(),
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        table.by_email.insert(email, record.id);
        table.by_id.insert(record.id, record.clone());

        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let table = self.users.read().await;
        Ok(table
            .by_email
            .get(&email.to_lowercase())
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Product>, StoreError> {
        // BTreeMap iteration is already ordered by id
        Ok(self
            .products
            .read()
            .await
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create(&self, product: NewProduct) -> Result<Product, StoreError> {
        let id = self.next_product_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let record = Product {
            id,
            user_id: product.user_id,
            name: product.name,
            price: product.price,
            description: product.description,
            created_at: now,
            updated_at: now,
        };
        self.products.write().await.insert(id, record.clone());
        Ok(record)
    }

    async fn find_for_user(&self, user_id: Uuid, id: i64) -> Result<Product, StoreError> {
        self.products
            .read()
            .await
            .get(&id)
            .filter(|p| p.user_id == user_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_for_user(
        &self,
        user_id: Uuid,
        id: i64,
        changes: ProductChanges,
    ) -> Result<Product, StoreError> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&id)
            .filter(|p| p.user_id == user_id)
            .ok_or(StoreError::NotFound)?;

        changes.apply(product);
        Ok(product.clone())
    }

    async fn delete_for_user(&self, user_id: Uuid, id: i64) -> Result<(), StoreError> {
        let mut products = self.products.write().await;
        match products.get(&id) {
            Some(product) if product.user_id == user_id => {
                products.remove(&id);
                Ok(())
            },
            _ => Err(StoreError::NotFound),
        }
    }
}

#[async_trait]
impl HealthCheck for InMemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
