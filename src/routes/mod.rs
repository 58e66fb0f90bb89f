// API route definitions
// The table below is the whole public surface; the axum router is generated from it

pub mod pattern;
pub mod router;
pub mod table;

pub use pattern::{PathPattern, PatternError};
pub use router::{build_router, RouteName};
pub use table::{
    Action, Guard, Middleware, ResourceAction, Route, RouteError, RouteMatch, RouteTable,
    RouteTableBuilder, RouteTableError,
};

/// Build the API route table under `prefix`
pub fn api_routes(prefix: &str) -> Result<RouteTable, RouteTableError> {
    RouteTable::builder()
        .prefix(prefix)
        .post("register", Action::Register)
        .name("register")
        .post("login", Action::Login)
        .name("login")
        .group(&[Middleware::Auth(Guard::Api)], |routes| {
            routes
                .get("get-user", Action::UserInfo)
                .name("userInfo")
                .resource("products", Action::Product)
        })
        .build()
}
