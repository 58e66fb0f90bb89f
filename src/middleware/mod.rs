// Middleware modules
// Access gate, api throttle and CORS

pub mod auth;
pub mod auth_middleware;
pub mod cors;
pub mod throttle;

pub use auth::AuthenticatedUser;
pub use auth_middleware::{auth_middleware, bearer_token};
pub use cors::cors_layer;
pub use throttle::{throttle_middleware, ApiThrottle, ClientIp};
