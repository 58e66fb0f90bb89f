// Declarative route table
// Built once at startup, immutable afterwards; resolves (method, path) to a route

use std::collections::HashSet;
use std::fmt;

use axum::http::Method;
use thiserror::Error;

use super::pattern::{PathPattern, PatternError};

/// The seven conventional actions of a resource controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceAction {
    Index,
    Create,
    Store,
    Show,
    Edit,
    Update,
    Destroy,
}

impl ResourceAction {
    /// Registration order. `create` must precede `show` so the literal
    /// segment wins over `{id}`.
    pub const ALL: [ResourceAction; 7] = [
        ResourceAction::Index,
        ResourceAction::Create,
        ResourceAction::Store,
        ResourceAction::Show,
        ResourceAction::Edit,
        ResourceAction::Update,
        ResourceAction::Destroy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceAction::Index => "index",
            ResourceAction::Create => "create",
            ResourceAction::Store => "store",
            ResourceAction::Show => "show",
            ResourceAction::Edit => "edit",
            ResourceAction::Update => "update",
            ResourceAction::Destroy => "destroy",
        }
    }

    fn methods(&self) -> Vec<Method> {
        match self {
            ResourceAction::Index
            | ResourceAction::Create
            | ResourceAction::Show
            | ResourceAction::Edit => vec![Method::GET],
            ResourceAction::Store => vec![Method::POST],
            ResourceAction::Update => vec![Method::PUT, Method::PATCH],
            ResourceAction::Destroy => vec![Method::DELETE],
        }
    }

    fn uri_suffix(&self) -> &'static str {
        match self {
            ResourceAction::Index | ResourceAction::Store => "",
            ResourceAction::Create => "/create",
            ResourceAction::Show | ResourceAction::Update | ResourceAction::Destroy => "/{id}",
            ResourceAction::Edit => "/{id}/edit",
        }
    }
}

/// Handler reference carried by a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Register,
    Login,
    UserInfo,
    Product(ResourceAction),
}

/// Authentication guard named by an `auth:<guard>` middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Guard {
    Api,
}

/// Named middleware attached to a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Middleware {
    Auth(Guard),
}

impl fmt::Display for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Middleware::Auth(Guard::Api) => write!(f, "auth:api"),
        }
    }
}

/// One entry of the route table
#[derive(Debug, Clone)]
pub struct Route {
    methods: Vec<Method>,
    uri: String,
    pattern: PathPattern,
    name: Option<String>,
    action: Action,
    middleware: Vec<Middleware>,
}

impl Route {
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// URI as registered, prefix included, without a leading slash
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn path(&self) -> String {
        self.pattern.path()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn middleware(&self) -> &[Middleware] {
        &self.middleware
    }

    pub fn requires_auth(&self) -> bool {
        self.middleware
            .iter()
            .any(|m| matches!(m, Middleware::Auth(_)))
    }

    /// GET routes also answer HEAD
    pub fn allows(&self, method: &Method) -> bool {
        self.methods.contains(method) || (*method == Method::HEAD && self.methods.contains(&Method::GET))
    }
}

/// Successful resolution of a request
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: Vec<(String, String)>,
}

impl RouteMatch<'_> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Runtime resolution failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("No route for {method} {path}")]
    NotFound { method: Method, path: String },
}

/// Startup-time table construction failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("Route {method} /{uri} is registered more than once")]
    DuplicateRoute { method: Method, uri: String },

    #[error("Route name '{0}' is registered more than once")]
    DuplicateName(String),

    #[error("Invalid route URI '{uri}': {reason}")]
    InvalidPattern { uri: String, reason: PatternError },
}

#[derive(Debug)]
struct PendingRoute {
    methods: Vec<Method>,
    uri: String,
    name: Option<String>,
    action: Action,
    middleware: Vec<Middleware>,
}

/// Fluent builder mirroring a route definition file
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    prefix: String,
    middleware: Vec<Middleware>,
    pending: Vec<PendingRoute>,
}

impl RouteTableBuilder {
    /// URI prefix applied to every route at build time
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.trim_matches('/').to_string();
        self
    }

    pub fn get(self, uri: &str, action: Action) -> Self {
        self.add(vec![Method::GET], uri, action)
    }

    pub fn post(self, uri: &str, action: Action) -> Self {
        self.add(vec![Method::POST], uri, action)
    }

    pub fn put(self, uri: &str, action: Action) -> Self {
        self.add(vec![Method::PUT], uri, action)
    }

    pub fn patch(self, uri: &str, action: Action) -> Self {
        self.add(vec![Method::PATCH], uri, action)
    }

    pub fn delete(self, uri: &str, action: Action) -> Self {
        self.add(vec![Method::DELETE], uri, action)
    }

    /// Name the most recently added route
    pub fn name(mut self, name: &str) -> Self {
        if let Some(last) = self.pending.last_mut() {
            last.name = Some(name.to_string());
        }
        self
    }

    /// Register routes inside `routes` with `middleware` applied to each
    pub fn group(mut self, middleware: &[Middleware], routes: impl FnOnce(Self) -> Self) -> Self {
        let depth = self.middleware.len();
        self.middleware.extend_from_slice(middleware);
        let mut builder = routes(self);
        builder.middleware.truncate(depth);
        builder
    }

    /// Expand a resource into its seven conventional routes, named
    /// `<name>.<action>`
    pub fn resource(mut self, name: &str, action: fn(ResourceAction) -> Action) -> Self {
        let base = name.trim_matches('/');
        for resource_action in ResourceAction::ALL {
            self = self
                .add(
                    resource_action.methods(),
                    &format!("{}{}", base, resource_action.uri_suffix()),
                    action(resource_action),
                )
                .name(&format!("{}.{}", base, resource_action.as_str()));
        }
        self
    }

    fn add(mut self, methods: Vec<Method>, uri: &str, action: Action) -> Self {
        self.pending.push(PendingRoute {
            methods,
            uri: uri.trim_matches('/').to_string(),
            name: None,
            action,
            middleware: self.middleware.clone(),
        });
        self
    }

    /// Validate patterns and uniqueness, producing the immutable table
    pub fn build(self) -> Result<RouteTable, RouteTableError> {
        let mut seen_routes = HashSet::new();
        let mut seen_names = HashSet::new();
        let mut routes = Vec::with_capacity(self.pending.len());

        for pending in self.pending {
            let uri = match (self.prefix.is_empty(), pending.uri.is_empty()) {
                (true, _) => pending.uri,
                (false, true) => self.prefix.clone(),
                (false, false) => format!("{}/{}", self.prefix, pending.uri),
            };

            let pattern = PathPattern::parse(&uri).map_err(|reason| {
                RouteTableError::InvalidPattern {
                    uri: uri.clone(),
                    reason,
                }
            })?;

            for method in &pending.methods {
                if !seen_routes.insert((method.clone(), pattern.shape())) {
                    return Err(RouteTableError::DuplicateRoute {
                        method: method.clone(),
                        uri,
                    });
                }
            }

            if let Some(name) = &pending.name {
                if !seen_names.insert(name.clone()) {
                    return Err(RouteTableError::DuplicateName(name.clone()));
                }
            }

            routes.push(Route {
                methods: pending.methods,
                uri,
                pattern,
                name: pending.name,
                action: pending.action,
                middleware: pending.middleware,
            });
        }

        Ok(RouteTable { routes })
    }
}

/// Immutable list of routes, matched linearly in registration order
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn resolve(&self, method: &Method, path: &str) -> Result<RouteMatch<'_>, RouteError> {
        self.routes
            .iter()
            .filter(|route| route.allows(method))
            .find_map(|route| {
                route
                    .pattern
                    .matches(path)
                    .map(|params| RouteMatch { route, params })
            })
            .ok_or_else(|| RouteError::NotFound {
                method: method.clone(),
                path: path.to_string(),
            })
    }

    pub fn by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.name() == Some(name))
    }

    /// Reverse routing: the concrete path of a named route
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Option<String> {
        self.by_name(name)?.pattern.render(params)
    }
}
