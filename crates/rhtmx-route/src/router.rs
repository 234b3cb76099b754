// File: src/router.rs
// Purpose: Ordered collection of routes with lookup by name

use serde::Deserialize;

use crate::{BuildParams, MatchRequest, Params, Route, RouteConfig, RouteError};

/// Result of matching a router against a request
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The first route that matched
    pub route: Route,
    /// Params extracted by that route
    pub params: Params,
}

/// Routes tried in insertion order
///
/// # Examples
///
/// ```
/// use rhtmx_route::{Route, RouteConfig, Router};
///
/// let router = Router::new()
///     .with_route(Route::new(RouteConfig::new("/users/<id>").with_name("user")).unwrap())
///     .with_route(Route::new(RouteConfig::new("/<slug>").with_name("page")).unwrap());
///
/// let m = router.match_route("/users/42").unwrap();
/// assert_eq!(m.route.name(), Some("user"));
/// assert_eq!(m.params["id"], "42");
///
/// assert_eq!(router.url_for_params("page", &[("slug", "about")]), Some("/about".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

#[derive(Deserialize)]
struct RouteTable {
    #[serde(default)]
    route: Vec<RouteConfig>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Loads routes from a TOML table of `[[route]]` entries
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_route::Router;
    ///
    /// let router = Router::from_toml(r#"
    ///     [[route]]
    ///     name = "item"
    ///     pattern = "/item/<id>"
    ///
    ///     [route.conditions]
    ///     id = '\d+'
    /// "#).unwrap();
    ///
    /// assert!(router.match_route("/item/7").is_some());
    /// assert!(router.match_route("/item/x").is_none());
    /// ```
    pub fn from_toml(source: &str) -> Result<Self, RouteError> {
        let table: RouteTable = toml::from_str(source)?;
        let routes = table.route.into_iter().map(Route::new).collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = routes.len(), "loaded route table");
        Ok(Self { routes })
    }

    /// Adds a route (functional style)
    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Adds several routes (functional style)
    pub fn with_routes<I>(mut self, routes: I) -> Self
    where
        I: IntoIterator<Item = Route>,
    {
        self.routes.extend(routes);
        self
    }

    /// Adds a route and returns a reference to it
    pub fn add_route(&mut self, route: Route) -> &Route {
        self.routes.push(route);
        &self.routes[self.routes.len() - 1]
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// First route whose name is `name`
    pub fn get_route_by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.name() == Some(name))
    }

    /// Matches routes in insertion order and returns the first hit
    pub fn match_route(&self, request: impl Into<MatchRequest>) -> Option<RouteMatch> {
        let request = request.into();

        self.routes.iter().find_map(|route| {
            route
                .matches(&request)
                .map(|params| RouteMatch { route: route.clone(), params })
        })
    }

    /// Builds a path with the route named `name`
    pub fn url_for(&self, name: &str, params: &BuildParams) -> Option<String> {
        self.get_route_by_name(name).map(|route| route.build(params))
    }

    /// Like [`url_for`](Self::url_for) with string-only params
    pub fn url_for_params(&self, name: &str, params: &[(&str, &str)]) -> Option<String> {
        self.get_route_by_name(name).map(|route| route.build_params(params))
    }
}
