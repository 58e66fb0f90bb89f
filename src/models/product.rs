// Product Database Model
// Products belong to exactly one user and are only visible to that user

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::schema::products;

pub const NAME_MAX_LENGTH: u64 = 255;
pub const DESCRIPTION_MAX_LENGTH: u64 = 2000;

/// Product database model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Product {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
    /// Minor currency units
    pub price: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = products)]
pub struct NewProduct {
    pub user_id: Uuid,
    pub name: String,
    pub price: i64,
    pub description: Option<String>,
}

/// Partial update. `description: Some(None)` clears the column.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub description: Option<Option<String>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProductChanges {
    /// Apply the changes to an in-memory copy
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        product.updated_at = self.updated_at.unwrap_or_else(Utc::now);
    }
}

/// Body of `POST /products`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StoreProductRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price: i64,

    #[validate(length(max = 2000, message = "Description must be less than 2000 characters"))]
    pub description: Option<String>,
}

/// Body of `PUT/PATCH /products/{id}`; omitted fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price: Option<i64>,

    #[validate(length(max = 2000, message = "Description must be less than 2000 characters"))]
    pub description: Option<String>,
}

/// One input of the product form schema
#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub required: bool,
    pub rules: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Input schema returned by the create and edit actions
#[derive(Debug, Clone, Serialize)]
pub struct ProductForm {
    pub action: String,
    pub method: &'static str,
    pub fields: Vec<FormField>,
}

impl ProductForm {
    /// Blank form submitting to the store route
    pub fn blank(action: String) -> Self {
        Self {
            action,
            method: "POST",
            fields: Self::fields(None),
        }
    }

    /// Form pre-filled with a product, submitting to its update route
    pub fn for_product(action: String, product: &Product) -> Self {
        Self {
            action,
            method: "PUT",
            fields: Self::fields(Some(product)),
        }
    }

    fn fields(product: Option<&Product>) -> Vec<FormField> {
        vec![
            FormField {
                name: "name",
                kind: "string",
                required: true,
                rules: vec!["min:1".to_string(), format!("max:{}", NAME_MAX_LENGTH)],
                value: product.map(|p| json!(p.name)),
            },
            FormField {
                name: "price",
                kind: "integer",
                required: true,
                rules: vec!["min:0".to_string()],
                value: product.map(|p| json!(p.price)),
            },
            FormField {
                name: "description",
                kind: "text",
                required: false,
                rules: vec![format!("max:{}", DESCRIPTION_MAX_LENGTH)],
                value: product.map(|p| json!(p.description)),
            },
        ]
    }
}

impl Product {
    /// All products of one user, oldest first
    pub async fn list_for_user(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::products::dsl::*;

        products
            .filter(user_id.eq(owner))
            .order(id.asc())
            .select(Product::as_select())
            .load::<Product>(conn)
            .await
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_product: NewProduct,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::products::dsl::*;

        diesel::insert_into(products)
            .values(&new_product)
            .returning(Product::as_returning())
            .get_result::<Product>(conn)
            .await
    }

    /// Find a product owned by `owner`; foreign products are reported as missing
    pub async fn find_for_user(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        product_id: i64,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::products::dsl::*;

        products
            .filter(id.eq(product_id))
            .filter(user_id.eq(owner))
            .select(Product::as_select())
            .first::<Product>(conn)
            .await
    }

    pub async fn update_for_user(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        product_id: i64,
        changes: ProductChanges,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::products::dsl::*;

        diesel::update(products.filter(id.eq(product_id)).filter(user_id.eq(owner)))
            .set(&changes)
            .returning(Product::as_returning())
            .get_result::<Product>(conn)
            .await
    }

    /// Returns the number of deleted rows (0 or 1)
    pub async fn delete_for_user(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        product_id: i64,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::products::dsl::*;

        diesel::delete(products.filter(id.eq(product_id)).filter(user_id.eq(owner)))
            .execute(conn)
            .await
    }
}
