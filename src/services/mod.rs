pub mod auth_provider;
pub mod jwt;
pub mod product;

pub use auth_provider::{AuthProvider, TokenAuthProvider};
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use product::ProductService;
