// Product resource handlers
// All seven actions sit behind the access gate and only see the caller's products

use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, State},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Json},
};
use serde::Serialize;

use super::ApiResponse;
use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    models::product::{Product, ProductForm, StoreProductRequest, UpdateProductRequest},
    utils::{service_error::ServiceError, validation::rejection_errors},
};

#[derive(Debug, Serialize)]
pub struct DeletedProduct {
    pub id: i64,
}

/// Product ids are positive integers; anything else cannot name a product
fn parse_product_id(raw: &str) -> Result<i64, ServiceError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(ServiceError::NotFound)
}

/// The `{id}` captured by the route the table resolves for this request.
/// Read from the table rather than axum's path params, since
/// `PUT products/create` reaches `update` through a static axum path.
pub struct ProductId(pub i64);

impl FromRequestParts<AppState> for ProductId {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let matched = state
            .routes
            .resolve(&parts.method, parts.uri.path())
            .map_err(|_| ServiceError::RouteNotFound)?;
        let raw = matched.param("id").ok_or(ServiceError::NotFound)?;
        parse_product_id(raw).map(ProductId)
    }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServiceError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ServiceError::ValidationError(rejection_errors(&rejection)))
}

/// GET /products
pub async fn index(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<Product>>>, ServiceError> {
    let products = state.products.list(user.user.id).await?;
    Ok(Json(ApiResponse::ok(products, "Products retrieved successfully")))
}

/// GET /products/create
pub async fn create(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<ApiResponse<ProductForm>>, ServiceError> {
    let form = state.products.blank_form()?;
    Ok(Json(ApiResponse::ok(form, "Product form")))
}

/// POST /products
pub async fn store(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<StoreProductRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let request = json_body(payload)?;
    let product = state.products.store(user.user.id, request).await?;
    let location = state.products.location(product.id)?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ApiResponse::ok(product, "Product created successfully")),
    ))
}

/// GET /products/{id}
pub async fn show(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ProductId(id): ProductId,
) -> Result<Json<ApiResponse<Product>>, ServiceError> {
    let product = state.products.show(user.user.id, id).await?;
    Ok(Json(ApiResponse::ok(product, "Product retrieved successfully")))
}

/// GET /products/{id}/edit
pub async fn edit(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ProductId(id): ProductId,
) -> Result<Json<ApiResponse<ProductForm>>, ServiceError> {
    let form = state.products.edit_form(user.user.id, id).await?;
    Ok(Json(ApiResponse::ok(form, "Product form")))
}

/// PUT/PATCH /products/{id}. The id is extracted before the body, so an
/// unknown id answers 404 even with a malformed payload.
pub async fn update(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ProductId(id): ProductId,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Product>>, ServiceError> {
    let request = json_body(payload)?;
    let product = state.products.update(user.user.id, id, request).await?;
    Ok(Json(ApiResponse::ok(product, "Product updated successfully")))
}

/// DELETE /products/{id}
pub async fn destroy(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ProductId(id): ProductId,
) -> Result<Json<ApiResponse<DeletedProduct>>, ServiceError> {
    state.products.destroy(user.user.id, id).await?;
    Ok(Json(ApiResponse::ok(
        DeletedProduct { id },
        "Product deleted successfully",
    )))
}
