// Product service
// Owner-scoped CRUD over the product repository

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::ProductRepository,
    models::product::{
        NewProduct, Product, ProductChanges, ProductForm, StoreProductRequest,
        UpdateProductRequest,
    },
    routes::RouteTable,
    utils::{
        service_error::ServiceError,
        validation::{field_errors, trim_and_validate_field, trim_optional_field, FieldErrors},
    },
};

pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    routes: Arc<RouteTable>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>, routes: Arc<RouteTable>) -> Self {
        Self { products, routes }
    }

    /// URL of a named route; the route table is fixed at startup, so a miss
    /// means the table and the handlers disagree
    fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Result<String, ServiceError> {
        self.routes.url_for(name, params).ok_or_else(|| {
            tracing::error!(route = name, "Reverse routing failed");
            ServiceError::InternalError
        })
    }

    /// `Location` of a stored product
    pub fn location(&self, product_id: i64) -> Result<String, ServiceError> {
        self.url_for("products.show", &[("id", product_id.to_string().as_str())])
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Product>, ServiceError> {
        Ok(self.products.list_for_user(user_id).await?)
    }

    pub fn blank_form(&self) -> Result<ProductForm, ServiceError> {
        Ok(ProductForm::blank(self.url_for("products.store", &[])?))
    }

    pub async fn store(
        &self,
        user_id: Uuid,
        request: StoreProductRequest,
    ) -> Result<Product, ServiceError> {
        let new_product = normalize_store(user_id, request).map_err(ServiceError::ValidationError)?;
        let product = self.products.create(new_product).await?;

        tracing::info!(user_id = %user_id, product_id = product.id, "Product created");
        Ok(product)
    }

    pub async fn show(&self, user_id: Uuid, product_id: i64) -> Result<Product, ServiceError> {
        Ok(self.products.find_for_user(user_id, product_id).await?)
    }

    pub async fn edit_form(
        &self,
        user_id: Uuid,
        product_id: i64,
    ) -> Result<ProductForm, ServiceError> {
        let product = self.show(user_id, product_id).await?;
        let action = self.url_for("products.update", &[("id", product.id.to_string().as_str())])?;
        Ok(ProductForm::for_product(action, &product))
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        product_id: i64,
        request: UpdateProductRequest,
    ) -> Result<Product, ServiceError> {
        let changes = normalize_update(request).map_err(ServiceError::ValidationError)?;
        let product = self
            .products
            .update_for_user(user_id, product_id, changes)
            .await?;

        tracing::info!(user_id = %user_id, product_id, "Product updated");
        Ok(product)
    }

    pub async fn destroy(&self, user_id: Uuid, product_id: i64) -> Result<(), ServiceError> {
        self.products.delete_for_user(user_id, product_id).await?;

        tracing::info!(user_id = %user_id, product_id, "Product deleted");
        Ok(())
    }
}

fn validation_errors(request: &impl Validate) -> FieldErrors {
    match request.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => field_errors(&e),
    }
}

fn trimmed_name(name: &str, errors: &mut FieldErrors) -> String {
    match trim_and_validate_field(name, true) {
        Ok(name) => name,
        Err(message) => {
            errors.entry("name".to_string()).or_insert_with(|| vec![message]);
            String::new()
        },
    }
}

fn normalize_store(user_id: Uuid, request: StoreProductRequest) -> Result<NewProduct, FieldErrors> {
    let mut errors = validation_errors(&request);
    let name = trimmed_name(&request.name, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewProduct {
        user_id,
        name,
        price: request.price,
        description: trim_optional_field(request.description.as_ref()),
    })
}

/// A blank description clears it; omitted fields stay as they are
fn normalize_update(request: UpdateProductRequest) -> Result<ProductChanges, FieldErrors> {
    let mut errors = validation_errors(&request);
    let name = request
        .name
        .as_deref()
        .map(|name| trimmed_name(name, &mut errors));

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ProductChanges {
        name,
        price: request.price,
        description: request
            .description
            .as_ref()
            .map(|description| trim_optional_field(Some(description))),
        updated_at: Some(Utc::now()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::InMemoryStore, routes::api_routes};

    fn service() -> ProductService {
        ProductService::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(api_routes("api").unwrap()),
        )
    }

    fn desk() -> StoreProductRequest {
        StoreProductRequest {
            name: "  Desk ".to_string(),
            price: 12_500,
            description: Some("   ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_store_normalizes_input() {
        let service = service();
        let owner = Uuid::new_v4();

        let product = service.store(owner, desk()).await.unwrap();
        assert_eq!(product.name, "Desk");
        assert_eq!(product.description, None);
        assert_eq!(
            service.location(product.id).unwrap(),
            format!("/api/products/{}", product.id)
        );
    }

    #[tokio::test]
    async fn test_store_rejects_blank_name() {
        let service = service();
        let mut request = desk();
        request.name = "   ".to_string();

        match service.store(Uuid::new_v4(), request).await {
            Err(ServiceError::ValidationError(fields)) => {
                assert_eq!(fields["name"], vec!["Field cannot be empty".to_string()])
            },
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_other_users_products_are_not_found() {
        let service = service();
        let owner = Uuid::new_v4();
        let product = service.store(owner, desk()).await.unwrap();

        let stranger = Uuid::new_v4();
        assert!(matches!(
            service.show(stranger, product.id).await,
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(
            service
                .update(stranger, product.id, UpdateProductRequest::default())
                .await,
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(
            service.destroy(stranger, product.id).await,
            Err(ServiceError::NotFound)
        ));
        assert!(service.show(owner, product.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let service = service();
        let owner = Uuid::new_v4();
        let mut request = desk();
        request.description = Some("Oak".to_string());
        let product = service.store(owner, request).await.unwrap();

        let updated = service
            .update(
                owner,
                product.id,
                UpdateProductRequest {
                    price: Some(9_900),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Desk");
        assert_eq!(updated.price, 9_900);
        assert_eq!(updated.description.as_deref(), Some("Oak"));

        let cleared = service
            .update(
                owner,
                product.id,
                UpdateProductRequest {
                    description: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.description, None);
    }

    #[tokio::test]
    async fn test_forms_point_at_store_and_update_routes() {
        let service = service();
        let owner = Uuid::new_v4();
        let product = service.store(owner, desk()).await.unwrap();

        assert_eq!(service.blank_form().unwrap().action, "/api/products");
        let edit = service.edit_form(owner, product.id).await.unwrap();
        assert_eq!(edit.action, format!("/api/products/{}", product.id));
        assert_eq!(edit.method, "PUT");
    }
}
