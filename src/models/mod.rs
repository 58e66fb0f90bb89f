pub mod auth;
pub mod product;
pub mod user;

// Re-export common types
pub use auth::{AccessTokenClaims, IssuedToken, LoginRequest, RegisterRequest, DEFAULT_SCOPE};
pub use product::{
    FormField, NewProduct, Product, ProductChanges, ProductForm, StoreProductRequest,
    UpdateProductRequest,
};
pub use user::{NewUser, User, UserProfile};
