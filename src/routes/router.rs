// Axum router generated from the route table
// Gated routes get the access gate as a route layer; every table route gets the api throttle

use axum::{
    http::Method,
    middleware::from_fn_with_state,
    routing::{get, on, MethodFilter, MethodRouter},
    Extension, Router,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

use super::table::{Action, ResourceAction, Route, RouteTable};
use crate::{
    app::AppState,
    handlers::{self, auth, products},
    middleware::{auth_middleware, cors_layer, throttle_middleware},
};

/// Name of the matched route, available to middleware and handlers through
/// request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteName(pub String);

/// Methods the router dispatches on. HEAD follows GET.
const DISPATCH_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// Build and configure the application router
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new();

    for (path, endpoints) in dispatch_plan(&state.routes) {
        for (route, filter) in endpoints {
            debug!(
                path = %path,
                name = route.name().unwrap_or("-"),
                middleware = %route
                    .middleware()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
                "Registering route"
            );
            router = router.route(&path, route_endpoint(&state, route, filter));
        }
    }

    router
        .route_layer(from_fn_with_state(state.clone(), throttle_middleware))
        .route("/health", get(handlers::health::health_check))
        .fallback(handlers::route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.security))
        .with_state(state)
}

/// For every distinct path in the table, the route that `RouteTable::resolve`
/// picks for each method, with the methods it serves there.
///
/// axum prefers static segments over parameters whatever the method, while
/// the table matches in registration order per method. Asking the table for
/// each (method, path) keeps the two in agreement: `PUT products/create`
/// lands on `products.update` just as `resolve` says.
fn dispatch_plan(table: &RouteTable) -> Vec<(String, Vec<(&Route, MethodFilter)>)> {
    let mut plan: Vec<(String, Vec<(&Route, MethodFilter)>)> = Vec::new();

    for route in table.routes() {
        let path = route.path();
        if plan.iter().any(|(seen, _)| *seen == path) {
            continue;
        }

        let mut endpoints: Vec<(&Route, MethodFilter)> = Vec::new();
        for method in DISPATCH_METHODS {
            // `path` renders parameters as `{name}`, which no literal segment
            // can equal, so it stands for every concrete path axum sends here
            let Ok(matched) = table.resolve(&method, &path) else {
                continue;
            };
            let Ok(filter) = MethodFilter::try_from(method) else {
                continue;
            };

            match endpoints
                .iter_mut()
                .find(|(winner, _)| std::ptr::eq(*winner, matched.route))
            {
                Some((_, existing)) => *existing = existing.or(filter),
                None => endpoints.push((matched.route, filter)),
            }
        }

        plan.push((path, endpoints));
    }

    plan
}

fn route_endpoint(state: &AppState, route: &Route, filter: MethodFilter) -> MethodRouter<AppState> {
    let mut endpoint = handler_for(route.action(), filter);
    if route.requires_auth() {
        endpoint = endpoint.route_layer(from_fn_with_state(state.clone(), auth_middleware));
    }

    let name = route.name().unwrap_or(route.uri()).to_string();
    endpoint.route_layer(Extension(RouteName(name)))
}

fn handler_for(action: Action, filter: MethodFilter) -> MethodRouter<AppState> {
    match action {
        Action::Register => on(filter, auth::register),
        Action::Login => on(filter, auth::login),
        Action::UserInfo => on(filter, auth::user_info),
        Action::Product(ResourceAction::Index) => on(filter, products::index),
        Action::Product(ResourceAction::Create) => on(filter, products::create),
        Action::Product(ResourceAction::Store) => on(filter, products::store),
        Action::Product(ResourceAction::Show) => on(filter, products::show),
        Action::Product(ResourceAction::Edit) => on(filter, products::edit),
        Action::Product(ResourceAction::Update) => on(filter, products::update),
        Action::Product(ResourceAction::Destroy) => on(filter, products::destroy),
    }
}
